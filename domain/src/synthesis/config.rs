//! Synthesizer configuration

use super::mode::{MergeStrategy, SynthesisMode};
use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::session::params::ModelParameters;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// How the individual answers of a round are merged (Value Object)
///
/// `intersection_threshold` is only meaningful in intersection mode. When it
/// is absent the threshold is derived from the number of responses at
/// synthesis time instead of being rejected up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    /// Model that performs the merge call
    pub model: Model,
    /// Merge policy
    #[serde(default)]
    pub mode: SynthesisMode,
    /// Minimum corroborating models in intersection mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intersection_threshold: Option<NonZeroU32>,
    /// Explicit parameters; `temperature` here overrides the mode default
    #[serde(default, skip_serializing_if = "ModelParameters::is_empty")]
    pub parameters: ModelParameters,
}

impl SynthesizerConfig {
    pub fn new(model: Model, mode: SynthesisMode) -> Self {
        Self {
            model,
            mode,
            intersection_threshold: None,
            parameters: ModelParameters::default(),
        }
    }

    /// Set an explicit intersection threshold; zero and negatives are rejected.
    pub fn with_threshold(mut self, threshold: i64) -> Result<Self, DomainError> {
        let value = u32::try_from(threshold)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or(DomainError::InvalidThreshold(threshold))?;
        self.intersection_threshold = Some(value);
        Ok(self)
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Resolve the configured mode against `response_count` responses.
    pub fn strategy_for(&self, response_count: usize) -> MergeStrategy {
        self.mode.resolve(
            self.intersection_threshold.map(NonZeroU32::get),
            response_count,
        )
    }

    /// Parameters for the merge call: explicit values over mode defaults.
    pub fn merge_parameters(&self) -> ModelParameters {
        self.parameters
            .clone()
            .with_default_temperature(self.mode.default_temperature())
    }
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self::new(Model::default(), SynthesisMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_must_be_positive() {
        let base = SynthesizerConfig::new(Model::Gpt4o, SynthesisMode::Intersection);
        assert_eq!(
            base.clone().with_threshold(0).unwrap_err(),
            DomainError::InvalidThreshold(0)
        );
        assert_eq!(
            base.clone().with_threshold(-3).unwrap_err(),
            DomainError::InvalidThreshold(-3)
        );
        let config = base.with_threshold(2).unwrap();
        assert_eq!(config.intersection_threshold.map(NonZeroU32::get), Some(2));
    }

    #[test]
    fn test_strategy_derives_threshold_when_absent() {
        let config = SynthesizerConfig::new(Model::Gpt4o, SynthesisMode::Intersection);
        assert_eq!(
            config.strategy_for(3),
            MergeStrategy::Intersection { threshold: 2 }
        );
        assert_eq!(
            config.strategy_for(5),
            MergeStrategy::Intersection { threshold: 3 }
        );
    }

    #[test]
    fn test_merge_parameters_use_mode_temperature() {
        let config = SynthesizerConfig::new(Model::Gpt4o, SynthesisMode::Selective);
        assert_eq!(config.merge_parameters().temperature, Some(0.4));

        let config = config.with_parameters(ModelParameters {
            temperature: Some(0.9),
            max_tokens: Some(2000),
            ..Default::default()
        });
        let params = config.merge_parameters();
        assert_eq!(params.temperature, Some(0.9));
        assert_eq!(params.max_tokens, Some(2000));
    }

    #[test]
    fn test_deserialize_rejects_zero_threshold() {
        let json = r#"{"model":"openai/gpt-4o","mode":"intersection","intersection_threshold":0}"#;
        assert!(serde_json::from_str::<SynthesizerConfig>(json).is_err());
    }

    #[test]
    fn test_deserialize_minimal() {
        let json = r#"{"model":"openai/gpt-4o"}"#;
        let config: SynthesizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mode, SynthesisMode::Union);
        assert!(config.intersection_threshold.is_none());
    }
}
