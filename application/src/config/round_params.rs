//! Round parameters - use case control.
//!
//! [`RoundParams`] groups the static parameters of a synthesis round that
//! are not part of a model group: how long to wait for models, which
//! language the merged answer must be in and which hedge phrases lower a
//! response's quality score.

use chatsynth_domain::{Locale, PromptTemplate, QualityScorer};
use std::time::Duration;

/// Round control parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundParams {
    /// Wait before unfinished model sessions are aborted. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Locale preset for language and hedge lexicon.
    pub locale: Locale,
    /// Target language override; defaults to the locale's language.
    pub language: Option<String>,
    /// Hedge lexicon override; defaults to the locale's preset.
    pub hedge_phrases: Option<Vec<String>>,
}

impl Default for RoundParams {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(120)),
            locale: Locale::default(),
            language: None,
            hedge_phrases: None,
        }
    }
}

impl RoundParams {
    // ==================== Builder Methods ====================

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_hedge_phrases(mut self, phrases: Vec<String>) -> Self {
        self.hedge_phrases = Some(phrases);
        self
    }

    // ==================== Derived Collaborators ====================

    /// Language the synthesizer must answer in.
    pub fn target_language(&self) -> &str {
        self.language
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| self.locale.language())
    }

    pub fn prompt_template(&self) -> PromptTemplate {
        PromptTemplate::new(self.target_language())
    }

    pub fn quality_scorer(&self) -> QualityScorer {
        match &self.hedge_phrases {
            Some(phrases) => QualityScorer::new(phrases.iter().cloned()),
            None => QualityScorer::for_locale(self.locale),
        }
    }
}
