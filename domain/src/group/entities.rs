//! Model group entities

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::session::params::ModelParameters;
use crate::synthesis::config::SynthesizerConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One model taking part in a round (Entity)
///
/// `id` identifies the slot in the response store and in synthesis prompts;
/// it defaults to the model string so two configs of the same model need
/// explicit ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub model: Model,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "ModelParameters::is_empty")]
    pub parameters: ModelParameters,
}

impl ModelConfig {
    pub fn new(model: Model) -> Self {
        Self {
            id: model.as_str().to_string(),
            display_name: model.display_name().to_string(),
            model,
            parameters: ModelParameters::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }
}

impl From<Model> for ModelConfig {
    fn from(model: Model) -> Self {
        Self::new(model)
    }
}

/// A named set of models plus the synthesizer that merges their answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelGroup {
    pub id: String,
    pub title: String,
    pub models: Vec<ModelConfig>,
    pub synthesizer: SynthesizerConfig,
}

impl ModelGroup {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        models: Vec<ModelConfig>,
        synthesizer: SynthesizerConfig,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            models,
            synthesizer,
        }
    }

    /// Group built from command-line model names.
    pub fn ad_hoc(models: Vec<Model>, synthesizer: SynthesizerConfig) -> Self {
        Self::new(
            "ad-hoc",
            "Ad-hoc group",
            models.into_iter().map(ModelConfig::new).collect(),
            synthesizer,
        )
    }

    /// Group of the built-in default models
    pub fn default_group() -> Self {
        Self::ad_hoc(Model::default_models(), SynthesizerConfig::default())
            .with_identity("default", "Default group")
    }

    pub fn with_identity(mut self, id: impl Into<String>, title: impl Into<String>) -> Self {
        self.id = id.into();
        self.title = title.into();
        self
    }

    /// A group needs at least one model and unique model ids.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.models.is_empty() {
            return Err(DomainError::EmptyGroup(self.id.clone()));
        }
        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.id.as_str()) {
                return Err(DomainError::DuplicateModelId {
                    group: self.id.clone(),
                    id: model.id.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
