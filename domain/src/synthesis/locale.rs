//! Deployment locale presets.
//!
//! A locale bundles the language the synthesizer must answer in with the
//! hedge lexicon used by the [`QualityScorer`](super::quality::QualityScorer).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported locale presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    #[serde(alias = "korean")]
    Ko,
    #[serde(alias = "english")]
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ko => "ko",
            Locale::En => "en",
        }
    }

    /// Language name embedded in synthesis system prompts
    pub fn language(&self) -> &'static str {
        match self {
            Locale::Ko => "Korean",
            Locale::En => "English",
        }
    }

    /// Phrases that signal an unsure answer
    pub fn hedge_phrases(&self) -> &'static [&'static str] {
        match self {
            Locale::Ko => &["모르겠", "확실하지", "잘 모르", "아마도", "가능합니다만"],
            Locale::En => &["not sure", "uncertain", "don't know", "maybe", "possibly but"],
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ko" | "korean" => Ok(Locale::Ko),
            "en" | "english" => Ok(Locale::En),
            other => Err(format!("unknown locale '{}' (expected ko or en)", other)),
        }
    }
}
