//! Round configuration from TOML (`[round]` section)

use chatsynth_application::RoundParams;
use chatsynth_domain::{ConfigIssue, ConfigIssueCode, Locale};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw round configuration from TOML
///
/// # Example
///
/// ```toml
/// [round]
/// timeout_secs = 90          # 0 waits forever
/// locale = "en"              # ko | en
/// language = "English"       # defaults to the locale's language
/// hedge_phrases = ["not sure", "maybe"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoundConfig {
    pub timeout_secs: u64,
    pub locale: String,
    pub language: Option<String>,
    pub hedge_phrases: Option<Vec<String>>,
}

impl Default for FileRoundConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 120,
            locale: Locale::default().as_str().to_string(),
            language: None,
            hedge_phrases: None,
        }
    }
}

impl FileRoundConfig {
    /// Parse the locale, warning and falling back to the default when unknown.
    pub fn parse_locale(&self) -> (Locale, Vec<ConfigIssue>) {
        match self.locale.parse::<Locale>() {
            Ok(locale) => (locale, vec![]),
            Err(_) => (
                Locale::default(),
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "round.locale".to_string(),
                        value: self.locale.clone(),
                        valid_values: vec!["ko".to_string(), "en".to_string()],
                    },
                    format!(
                        "round.locale: unknown value '{}', falling back to '{}'",
                        self.locale,
                        Locale::default()
                    ),
                )],
            ),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Application round parameters
    pub fn to_round_params(&self) -> (RoundParams, Vec<ConfigIssue>) {
        let (locale, issues) = self.parse_locale();
        let mut params = RoundParams::default()
            .with_timeout(self.timeout())
            .with_locale(locale);
        if let Some(language) = &self.language {
            params = params.with_language(language.clone());
        }
        if let Some(phrases) = &self.hedge_phrases {
            params = params.with_hedge_phrases(phrases.clone());
        }
        (params, issues)
    }
}
