//! OpenRouter chat-completion wire types
//!
//! Request body for `POST {base_url}/chat/completions` with `stream: true`
//! and the JSON payload of each `data:` frame of the response.

use chatsynth_domain::{ChatRequest, Message, ModelParameters};
use serde::{Deserialize, Serialize};

/// Request body; parameters are flattened so only set ones are sent.
#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
    #[serde(flatten)]
    pub parameters: &'a ModelParameters,
}

impl<'a> ChatCompletionBody<'a> {
    pub fn streaming(request: &'a ChatRequest) -> Self {
        Self {
            model: request.model().as_str(),
            messages: request.messages(),
            stream: true,
            parameters: request.parameters(),
        }
    }
}

/// Payload of one `data:` frame. Absent fields mean "no value".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    /// Mid-stream error reported inside a frame
    #[serde(default)]
    pub error: Option<StreamErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Option<StreamDelta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamErrorBody {
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: String,
}

impl StreamChunk {
    /// Text carried by the first choice's delta, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .iter()
            .find(|c| c.index == 0)
            .and_then(|c| c.delta.as_ref())
            .and_then(|d| d.content.as_deref())
            .filter(|s| !s.is_empty())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices
            .iter()
            .find_map(|c| c.finish_reason.as_deref())
    }
}
