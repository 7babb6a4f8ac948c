//! OpenRouter connection configuration from TOML (`[openrouter]` section)

use crate::openrouter::client::{DEFAULT_API_KEY_ENV, DEFAULT_APP_TITLE, DEFAULT_BASE_URL};
use crate::openrouter::{OpenRouterError, OpenRouterSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw OpenRouter configuration from TOML
///
/// # Example
///
/// ```toml
/// [openrouter]
/// base_url = "https://openrouter.ai/api/v1"
/// api_key_env = "OPENROUTER_API_KEY"
/// app_title = "ChatSynthesizer"
/// referer = "https://example.com"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOpenRouterConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Inline API key; takes precedence over `api_key_env`
    pub api_key: Option<String>,
    pub app_title: String,
    pub referer: Option<String>,
    pub connect_timeout_secs: u64,
}

impl Default for FileOpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            app_title: DEFAULT_APP_TITLE.to_string(),
            referer: None,
            connect_timeout_secs: 10,
        }
    }
}

impl FileOpenRouterConfig {
    /// API key from the config file or the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Client settings, failing when no API key can be found
    pub fn to_settings(&self) -> Result<OpenRouterSettings, OpenRouterError> {
        let api_key = self
            .resolve_api_key()
            .ok_or_else(|| OpenRouterError::MissingApiKey(self.api_key_env.clone()))?;

        let mut settings = OpenRouterSettings::new(api_key)
            .with_api_key_env(&self.api_key_env)
            .with_base_url(&self.base_url)
            .with_app_title(&self.app_title);
        if let Some(referer) = self.referer.as_deref().filter(|r| !r.trim().is_empty()) {
            settings = settings.with_referer(referer);
        }
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_key_wins() {
        let config = FileOpenRouterConfig {
            api_key: Some("sk-inline".to_string()),
            api_key_env: "CHATSYNTH_TEST_UNSET_KEY_VAR".to_string(),
            referer: Some("https://example.com".to_string()),
            ..Default::default()
        };
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.api_key, "sk-inline");
        assert_eq!(settings.api_key_env, "CHATSYNTH_TEST_UNSET_KEY_VAR");
        assert_eq!(settings.referer.as_deref(), Some("https://example.com"));
        assert_eq!(settings.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_key_names_env_var() {
        let config = FileOpenRouterConfig {
            api_key_env: "CHATSYNTH_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        match config.to_settings() {
            Err(OpenRouterError::MissingApiKey(var)) => {
                assert_eq!(var, "CHATSYNTH_TEST_UNSET_KEY_VAR")
            }
            other => panic!("expected missing key, got {:?}", other),
        }
    }
}
