//! Synthesis outcome value objects.
//!
//! - [`SynthesisOutcome`] - tagged result of one synthesis call
//! - [`ScoredResponse`] - a model response with its advisory quality score
//! - [`RoundResult`] - everything a round produced

use super::mode::SynthesisMode;
use super::response::ModelResponse;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Message emitted when a round produced no responses at all.
pub const NO_RESPONSES_MESSAGE: &str = "No responses were received.";

/// Message emitted when no response completed with content.
pub const NO_COMPLETED_MESSAGE: &str = "No completed responses are available.";

/// Result of one synthesis call. Always carries user-visible text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    /// The synthesizer streamed a merged answer; `text` is the
    /// concatenation of its deltas in arrival order.
    Merged {
        synthesizer: Model,
        mode: SynthesisMode,
        text: String,
    },
    /// The merge call failed and the deterministic fallback was used.
    Fallback {
        synthesizer: Model,
        mode: SynthesisMode,
        reason: String,
        text: String,
    },
    /// The round had no responses.
    NoResponses { text: String },
    /// Every response was incomplete or blank.
    NoCompletedResponses { text: String },
}

impl SynthesisOutcome {
    pub fn no_responses() -> Self {
        SynthesisOutcome::NoResponses {
            text: NO_RESPONSES_MESSAGE.to_string(),
        }
    }

    pub fn no_completed_responses() -> Self {
        SynthesisOutcome::NoCompletedResponses {
            text: NO_COMPLETED_MESSAGE.to_string(),
        }
    }

    /// The final text shown to the user.
    pub fn text(&self) -> &str {
        match self {
            SynthesisOutcome::Merged { text, .. }
            | SynthesisOutcome::Fallback { text, .. }
            | SynthesisOutcome::NoResponses { text }
            | SynthesisOutcome::NoCompletedResponses { text } => text,
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, SynthesisOutcome::Merged { .. })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SynthesisOutcome::Fallback { .. })
    }

    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            SynthesisOutcome::Merged { .. } => "merged",
            SynthesisOutcome::Fallback { .. } => "fallback",
            SynthesisOutcome::NoResponses { .. } => "no responses",
            SynthesisOutcome::NoCompletedResponses { .. } => "no completed responses",
        }
    }
}

/// A model response together with its quality score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResponse {
    #[serde(flatten)]
    pub response: ModelResponse,
    /// Present only for completed responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

/// Complete result of one synthesis round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// The original question
    pub question: String,
    /// Title of the model group that answered
    pub group: String,
    /// Every model's response in configuration order
    pub responses: Vec<ScoredResponse>,
    /// The synthesized answer
    pub outcome: SynthesisOutcome,
}

impl RoundResult {
    pub fn new(
        question: impl Into<String>,
        group: impl Into<String>,
        responses: Vec<ScoredResponse>,
        outcome: SynthesisOutcome,
    ) -> Self {
        Self {
            question: question.into(),
            group: group.into(),
            responses,
            outcome,
        }
    }

    /// Model ids whose answers were eligible for synthesis.
    pub fn synthesized_from(&self) -> Vec<&str> {
        self.responses
            .iter()
            .filter(|r| r.response.is_usable())
            .map(|r| r.response.model_id.as_str())
            .collect()
    }

    pub fn failed_responses(&self) -> impl Iterator<Item = &ModelResponse> {
        self.responses
            .iter()
            .map(|r| &r.response)
            .filter(|r| !r.is_completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(SynthesisOutcome::no_responses().text(), NO_RESPONSES_MESSAGE);
        assert_eq!(
            SynthesisOutcome::no_completed_responses().text(),
            NO_COMPLETED_MESSAGE
        );
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = SynthesisOutcome::Merged {
            synthesizer: Model::Gpt4o,
            mode: SynthesisMode::Union,
            text: "merged".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "merged");
        assert_eq!(json["synthesizer"], "openai/gpt-4o");
        assert_eq!(json["mode"], "union");
    }

    #[test]
    fn test_round_result_tracks_sources() {
        let responses = vec![
            ScoredResponse {
                response: ModelResponse::completed("a", "A", "text"),
                quality: Some(10),
            },
            ScoredResponse {
                response: ModelResponse::started("b", "B"),
                quality: None,
            },
        ];
        let result = RoundResult::new(
            "q",
            "group",
            responses,
            SynthesisOutcome::no_completed_responses(),
        );
        assert_eq!(result.synthesized_from(), vec!["a"]);
        assert_eq!(result.failed_responses().count(), 1);
    }
}
