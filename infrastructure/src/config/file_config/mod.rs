//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain types on demand.

mod groups;
mod openrouter;
mod output;
mod repl;
mod round;

pub use groups::{FileGroupConfig, FileModelEntry, FileSynthesizerConfig};
pub use openrouter::FileOpenRouterConfig;
pub use output::FileOutputConfig;
pub use repl::FileReplConfig;
pub use round::FileRoundConfig;

use chatsynth_domain::{ConfigIssue, ConfigIssueCode, ModelGroup};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a configured group cannot be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupLookupError {
    #[error("Unknown model group '{name}' (available: {available})")]
    Unknown { name: String, available: String },

    #[error("Model group '{name}' is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend connection settings
    pub openrouter: FileOpenRouterConfig,
    /// Round timing, language and scoring
    pub round: FileRoundConfig,
    /// Named model groups
    pub groups: Vec<FileGroupConfig>,
    /// Group used when none is requested
    pub default_group: Option<String>,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks locale values, every group (model names, modes, thresholds,
    /// duplicate ids) and that `default_group` names a configured group.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.round.parse_locale().1);

        for group in &self.groups {
            issues.extend(group.to_group().1);
        }

        if let Some(name) = &self.default_group
            && self.group(name).is_none()
        {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownGroup { name: name.clone() },
                format!("default_group: no group with id '{}' is configured", name),
            ));
        }

        issues
    }

    /// Raw group by id
    pub fn group(&self, id: &str) -> Option<&FileGroupConfig> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_ids(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.id.as_str()).collect()
    }

    /// Resolve the group a round should use.
    ///
    /// `requested` wins over `default_group`; without either the first
    /// configured group is used, and without any groups the built-in
    /// default group.
    pub fn resolve_group(&self, requested: Option<&str>) -> Result<ModelGroup, GroupLookupError> {
        let name = requested.or(self.default_group.as_deref());

        let raw = match name {
            Some(name) => self.group(name).ok_or_else(|| GroupLookupError::Unknown {
                name: name.to_string(),
                available: if self.groups.is_empty() {
                    "none".to_string()
                } else {
                    self.group_ids().join(", ")
                },
            })?,
            None => match self.groups.first() {
                Some(first) => first,
                None => return Ok(ModelGroup::default_group()),
            },
        };

        let (group, issues) = raw.to_group();
        group.ok_or_else(|| GroupLookupError::Invalid {
            name: raw.id.clone(),
            reason: issues
                .iter()
                .filter(|i| i.is_error())
                .map(|i| i.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        })
    }
}
