//! OpenRouter implementation of the chat-completion gateway port

use super::client::{OpenRouterClient, OpenRouterSettings, pump_stream};
use super::error::Result;
use async_trait::async_trait;
use chatsynth_application::{ChatCompletionGateway, GatewayError, StreamHandle};
use chatsynth_domain::ChatRequest;
use tokio::sync::mpsc;
use tracing::warn;

/// Capacity of the per-request event channel
const EVENT_BUFFER: usize = 64;

/// Streams chat completions from OpenRouter
pub struct OpenRouterGateway {
    client: OpenRouterClient,
}

impl OpenRouterGateway {
    pub fn new(settings: &OpenRouterSettings) -> Result<Self> {
        Ok(Self {
            client: OpenRouterClient::new(settings)?,
        })
    }
}

#[async_trait]
impl ChatCompletionGateway for OpenRouterGateway {
    async fn stream_chat(&self, request: ChatRequest) -> std::result::Result<StreamHandle, GatewayError> {
        let label = request.model().to_string();
        let response = self.client.open_stream(&request).await.map_err(|e| {
            warn!("{}: request failed: {}", label, e);
            GatewayError::from(e)
        })?;

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        tokio::spawn(pump_stream(response, tx, label));
        Ok(StreamHandle::new(rx))
    }
}
