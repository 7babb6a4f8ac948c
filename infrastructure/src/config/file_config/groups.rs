//! Model group configuration from TOML (`[[groups]]` array)

use chatsynth_domain::{
    ConfigIssue, ConfigIssueCode, Model, ModelConfig, ModelGroup, ModelParameters, SynthesisMode,
    SynthesizerConfig,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// One model of a group
///
/// `parameters` is a free-form table; only whitelisted keys are forwarded
/// to the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelEntry {
    pub id: Option<String>,
    pub model: String,
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

/// Synthesizer of a group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSynthesizerConfig {
    pub model: Option<String>,
    pub mode: Option<String>,
    pub intersection_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

/// A named model group
///
/// # Example
///
/// ```toml
/// [[groups]]
/// id = "research"
/// title = "Research panel"
///
/// [[groups.models]]
/// model = "openai/gpt-4o"
/// parameters = { temperature = 0.7 }
///
/// [[groups.models]]
/// id = "claude"
/// model = "anthropic/claude-3.5-sonnet"
/// display_name = "Claude"
///
/// [groups.synthesizer]
/// model = "openai/gpt-4o-mini"
/// mode = "intersection"
/// intersection_threshold = 2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGroupConfig {
    pub id: String,
    pub title: Option<String>,
    pub models: Vec<FileModelEntry>,
    pub synthesizer: FileSynthesizerConfig,
}

impl FileGroupConfig {
    /// Parse the synthesizer mode.
    ///
    /// Unknown values fall back to union with a warning; a missing value is union.
    pub fn parse_mode(&self) -> (SynthesisMode, Vec<ConfigIssue>) {
        let Some(raw) = self.synthesizer.mode.as_deref() else {
            return (SynthesisMode::default(), vec![]);
        };
        let (mode, known) = SynthesisMode::parse_lenient(raw);
        if known {
            return (mode, vec![]);
        }

        let field = format!("groups.{}.synthesizer.mode", self.id);
        warn!("{}: unknown mode '{}', using union", field, raw);
        let issue = ConfigIssue::warning(
            ConfigIssueCode::InvalidEnumValue {
                field: field.clone(),
                value: raw.to_string(),
                valid_values: SynthesisMode::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            },
            format!("{}: unknown value '{}', falling back to 'union'", field, raw),
        );
        (mode, vec![issue])
    }

    fn parse_synthesizer(&self) -> (Option<SynthesizerConfig>, Vec<ConfigIssue>) {
        let (mode, mut issues) = self.parse_mode();

        let model = match self.synthesizer.model.as_deref() {
            Some(name) if name.trim().is_empty() => {
                issues.push(empty_model_issue(format!(
                    "groups.{}.synthesizer.model",
                    self.id
                )));
                return (None, issues);
            }
            Some(name) => Model::from(name),
            None => Model::default(),
        };

        let mut config = SynthesizerConfig::new(model, mode)
            .with_parameters(ModelParameters::from_raw(&self.synthesizer.parameters));

        if let Some(threshold) = self.synthesizer.intersection_threshold {
            match config.clone().with_threshold(threshold) {
                Ok(with_threshold) => config = with_threshold,
                Err(error) => {
                    let field = format!("groups.{}.synthesizer.intersection_threshold", self.id);
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::InvalidThreshold {
                            field: field.clone(),
                            value: threshold,
                        },
                        format!("{}: {}", field, error),
                    ));
                    return (None, issues);
                }
            }
        }

        (Some(config), issues)
    }

    fn parse_models(&self) -> (Vec<ModelConfig>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut models = Vec::with_capacity(self.models.len());

        for (index, entry) in self.models.iter().enumerate() {
            if entry.model.trim().is_empty() {
                issues.push(empty_model_issue(format!(
                    "groups.{}.models[{}].model",
                    self.id, index
                )));
                continue;
            }
            let model = Model::from(entry.model.as_str());
            let mut config = ModelConfig::new(model)
                .with_parameters(ModelParameters::from_raw(&entry.parameters));
            if let Some(id) = entry.id.as_deref().filter(|id| !id.trim().is_empty()) {
                config = config.with_id(id);
            }
            if let Some(name) = entry.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
                config = config.with_display_name(name);
            }
            models.push(config);
        }

        (models, issues)
    }

    /// Convert into a domain group, collecting every issue found on the way.
    ///
    /// Returns `None` when an error-severity issue makes the group unusable.
    pub fn to_group(&self) -> (Option<ModelGroup>, Vec<ConfigIssue>) {
        let (models, mut issues) = self.parse_models();
        let (synthesizer, synth_issues) = self.parse_synthesizer();
        issues.extend(synth_issues);

        if self.models.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyGroup {
                    group: self.id.clone(),
                },
                format!("groups.{}: group has no models", self.id),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for model in &models {
            if !seen.insert(model.id.as_str()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::DuplicateModelId {
                        group: self.id.clone(),
                        id: model.id.clone(),
                    },
                    format!(
                        "groups.{}: model id '{}' is used more than once",
                        self.id, model.id
                    ),
                ));
            }
        }

        if issues.iter().any(ConfigIssue::is_error) {
            return (None, issues);
        }
        let Some(synthesizer) = synthesizer else {
            return (None, issues);
        };

        let title = self.title.clone().unwrap_or_else(|| self.id.clone());
        (
            Some(ModelGroup::new(self.id.clone(), title, models, synthesizer)),
            issues,
        )
    }
}

fn empty_model_issue(field: String) -> ConfigIssue {
    ConfigIssue::error(
        ConfigIssueCode::EmptyModelName {
            field: field.clone(),
        },
        format!("{}: model name must not be empty", field),
    )
}
