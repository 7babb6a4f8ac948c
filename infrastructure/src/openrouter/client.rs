//! HTTP client for the OpenRouter chat-completion endpoint

use super::error::{OpenRouterError, Result};
use super::protocol::ChatCompletionBody;
use super::sse::{SseDecoder, SseFrame};
use chatsynth_domain::{ChatRequest, StreamEvent};
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default `X-Title` header value
pub const DEFAULT_APP_TITLE: &str = "ChatSynthesizer";

/// Connection settings for [`OpenRouterClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRouterSettings {
    pub base_url: String,
    pub api_key: String,
    /// Where `api_key` came from, named in missing-key errors
    pub api_key_env: String,
    /// Sent as `X-Title`
    pub app_title: String,
    /// Sent as `HTTP-Referer` when present
    pub referer: Option<String>,
    pub connect_timeout: Duration,
}

impl OpenRouterSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            referer: None,
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_app_title(mut self, title: impl Into<String>) -> Self {
        self.app_title = title.into();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Streaming chat-completion client
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    url: String,
}

impl OpenRouterClient {
    pub fn new(settings: &OpenRouterSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(OpenRouterError::MissingApiKey(settings.api_key_env.clone()));
        }

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|_| OpenRouterError::InvalidHeader("Authorization"))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Title",
            HeaderValue::from_str(&settings.app_title)
                .map_err(|_| OpenRouterError::InvalidHeader("X-Title"))?,
        );
        if let Some(referer) = &settings.referer {
            headers.insert(
                "HTTP-Referer",
                HeaderValue::from_str(referer)
                    .map_err(|_| OpenRouterError::InvalidHeader("HTTP-Referer"))?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .build()?;

        info!("OpenRouter client initialized for {}", settings.base_url);

        Ok(Self {
            http,
            url: settings.completions_url(),
        })
    }

    /// Send a streaming request and wait for the response headers.
    ///
    /// Non-2xx responses are turned into [`OpenRouterError::Status`] with
    /// the response body.
    pub async fn open_stream(&self, request: &ChatRequest) -> Result<reqwest::Response> {
        let body = ChatCompletionBody::streaming(request);
        debug!(
            "POST {} model={} messages={}",
            self.url,
            body.model,
            body.messages.len()
        );

        let response = self.http.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OpenRouterError::Status { status, body });
        }

        Ok(response)
    }
}

/// Forward the frames of `response` to `tx` until the stream ends.
///
/// Sends any number of `Delta` events followed by exactly one `Completed`
/// (on `[DONE]` or a clean close) or `Error` (transport failure or error
/// frame). Returns early, dropping the connection, when the receiver is
/// gone.
pub async fn pump_stream(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>, label: String) {
    let mut stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut text = String::new();
    let mut finish_reason = None;

    loop {
        let next = tokio::select! {
            next = stream.next() => next,
            _ = tx.closed() => {
                debug!("{}: receiver dropped, closing stream", label);
                return;
            }
        };

        let frames = match next {
            Some(Ok(bytes)) => decoder.feed(&bytes),
            Some(Err(e)) => {
                warn!("{}: stream error: {}", label, e);
                let _ = tx.send(StreamEvent::Error(format!("stream error: {}", e))).await;
                return;
            }
            None => {
                let mut frames = decoder.finish();
                frames.push(SseFrame::Done);
                frames
            }
        };

        for frame in frames {
            match frame {
                SseFrame::Chunk(chunk) => {
                    if let Some(error) = &chunk.error {
                        warn!("{}: error frame: {}", label, error.message);
                        let _ = tx.send(StreamEvent::Error(error.message.clone())).await;
                        return;
                    }
                    if let Some(reason) = chunk.finish_reason() {
                        finish_reason = Some(reason.to_string());
                    }
                    if let Some(content) = chunk.content() {
                        text.push_str(content);
                        if tx.send(StreamEvent::Delta(content.to_string())).await.is_err() {
                            return;
                        }
                    }
                }
                SseFrame::Done => {
                    debug!(
                        "{}: stream done ({} chars, {} malformed frames, finish_reason={})",
                        label,
                        text.chars().count(),
                        decoder.skipped(),
                        finish_reason.as_deref().unwrap_or("none")
                    );
                    let _ = tx.send(StreamEvent::Completed(text)).await;
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_api_key() {
        let result = OpenRouterClient::new(&OpenRouterSettings::new("  "));
        assert!(matches!(
            result,
            Err(OpenRouterError::MissingApiKey(var)) if var == DEFAULT_API_KEY_ENV
        ));

        let settings = OpenRouterSettings::new("").with_api_key_env("MY_ROUTER_KEY");
        assert!(matches!(
            OpenRouterClient::new(&settings),
            Err(OpenRouterError::MissingApiKey(var)) if var == "MY_ROUTER_KEY"
        ));
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let settings = OpenRouterSettings::new("k").with_base_url("http://localhost:9/api/v1/");
        assert_eq!(
            settings.completions_url(),
            "http://localhost:9/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_rejects_header_breaking_values() {
        let settings = OpenRouterSettings::new("k").with_app_title("bad\ntitle");
        assert!(matches!(
            OpenRouterClient::new(&settings),
            Err(OpenRouterError::InvalidHeader("X-Title"))
        ));
    }
}
