//! Chat-completion gateway port
//!
//! Defines the interface for streaming chat completions from a model backend.

use async_trait::async_trait;
use chatsynth_domain::{ChatRequest, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur before a stream is established
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for streaming chat completions
///
/// This port defines how the application layer talks to model backends.
/// Implementations (adapters) live in the infrastructure layer and own
/// authentication, endpoints and request metadata.
#[async_trait]
pub trait ChatCompletionGateway: Send + Sync {
    /// Open a streaming completion for `request`.
    ///
    /// Returns once the backend accepted the request. Failures after that
    /// point arrive as [`StreamEvent::Error`] on the handle.
    async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError>;
}

/// Handle for receiving streaming events from one completion.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. Dropping the handle closes the
/// channel, which tells the producing adapter to release its connection.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Handle that yields `events` and then ends.
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // capacity covers every event
            let _ = tx.try_send(event);
        }
        Self::new(rx)
    }

    /// Next event, `None` once the producer is gone.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        Err(GatewayError::TransportClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_text_concatenates_deltas() {
        let handle = StreamHandle::from_events(vec![
            StreamEvent::Delta("Hel".to_string()),
            StreamEvent::Delta("lo".to_string()),
            StreamEvent::Completed(String::new()),
        ]);
        assert_eq!(handle.collect_text().await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_collect_text_uses_completed_text_without_deltas() {
        let handle = StreamHandle::from_events(vec![StreamEvent::Completed("whole".to_string())]);
        assert_eq!(handle.collect_text().await.unwrap(), "whole");
    }

    #[tokio::test]
    async fn test_collect_text_reports_errors() {
        let handle = StreamHandle::from_events(vec![
            StreamEvent::Delta("partial".to_string()),
            StreamEvent::Error("reset".to_string()),
        ]);
        assert_eq!(
            handle.collect_text().await,
            Err(GatewayError::RequestFailed("reset".to_string()))
        );
    }

    #[tokio::test]
    async fn test_collect_text_without_terminal_event() {
        let handle = StreamHandle::from_events(vec![StreamEvent::Delta("cut".to_string())]);
        assert_eq!(handle.collect_text().await, Err(GatewayError::TransportClosed));
    }
}
