//! Per-model result record of a synthesis round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The answer one model produced during a round (Entity)
///
/// Written by exactly one streaming session. `content` only ever grows while
/// the session is in flight; once the record is completed or failed it no
/// longer accepts text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Identifier of the model configuration that produced this response
    pub model_id: String,
    /// Display name of the model
    pub model_name: String,
    /// Accumulated response text
    pub content: String,
    /// Whether the stream reached its normal end
    pub is_completed: bool,
    /// Why the stream ended abnormally, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the session started
    pub timestamp: DateTime<Utc>,
}

impl ModelResponse {
    /// Creates an empty, in-flight record.
    pub fn started(model_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            model_name: model_name.into(),
            content: String::new(),
            is_completed: false,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a completed record in one step.
    pub fn completed(
        model_id: impl Into<String>,
        model_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut response = Self::started(model_id, model_name);
        response.content = content.into();
        response.is_completed = true;
        response
    }

    /// Append a streamed delta. Returns `false` once the record is closed.
    pub fn append(&mut self, delta: &str) -> bool {
        if self.is_closed() {
            return false;
        }
        self.content.push_str(delta);
        true
    }

    /// Mark the stream as finished normally.
    pub fn complete(&mut self) {
        if self.error.is_none() {
            self.is_completed = true;
        }
    }

    /// Mark the stream as failed; partial content is kept.
    pub fn fail(&mut self, error: impl Into<String>) {
        if !self.is_completed {
            self.error = Some(error.into());
        }
    }

    /// Whether the session can no longer write to this record.
    pub fn is_closed(&self) -> bool {
        self.is_completed || self.error.is_some()
    }

    /// Completed with non-blank content: eligible for synthesis.
    pub fn is_usable(&self) -> bool {
        self.is_completed && !self.content.trim().is_empty()
    }

    /// Number of characters received so far.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}
