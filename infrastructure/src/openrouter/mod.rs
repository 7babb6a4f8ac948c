//! OpenRouter adapter
//!
//! Implements [`ChatCompletionGateway`](chatsynth_application::ChatCompletionGateway)
//! over OpenRouter's OpenAI-compatible streaming endpoint.

pub mod client;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod sse;

pub use client::{OpenRouterClient, OpenRouterSettings};
pub use error::OpenRouterError;
pub use gateway::OpenRouterGateway;
