//! Error types for the OpenRouter adapter

use chatsynth_application::GatewayError;
use thiserror::Error;

/// Result type alias for OpenRouter operations
pub type Result<T> = std::result::Result<T, OpenRouterError>;

/// Errors that can occur when talking to the OpenRouter API
#[derive(Error, Debug)]
pub enum OpenRouterError {
    #[error("No API key configured (set {0} or openrouter.api_key)")]
    MissingApiKey(String),

    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OpenRouter API error {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<OpenRouterError> for GatewayError {
    fn from(error: OpenRouterError) -> Self {
        match &error {
            OpenRouterError::MissingApiKey(_) => GatewayError::Unauthorized(error.to_string()),
            OpenRouterError::Status { status, .. } => match status {
                401 | 403 => GatewayError::Unauthorized(error.to_string()),
                404 => GatewayError::ModelNotAvailable(error.to_string()),
                408 | 504 => GatewayError::Timeout,
                _ => GatewayError::RequestFailed(error.to_string()),
            },
            OpenRouterError::Transport(e) if e.is_timeout() => GatewayError::Timeout,
            OpenRouterError::Transport(e) if e.is_connect() => {
                GatewayError::ConnectionError(error.to_string())
            }
            _ => GatewayError::Other(error.to_string()),
        }
    }
}
