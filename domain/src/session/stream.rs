//! Streaming events for chat-completion calls.
//!
//! [`StreamEvent`] represents individual events in a streaming response,
//! enabling real-time display of model output as it's generated.

/// An event in a streaming chat-completion response.
///
/// Bridges the infrastructure-level SSE frames to the application layer.
/// A stream carries any number of `Delta` events followed by exactly one
/// terminal event (`Completed` or `Error`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model (`choices[0].delta.content`).
    Delta(String),
    /// The complete response text (signals stream end).
    Completed(String),
    /// A transport or protocol failure that ended the stream.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) | StreamEvent::Completed(s) => Some(s),
            StreamEvent::Error(_) => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}
