//! Sampling and penalty parameters forwarded to the chat-completion backend.
//!
//! Only a fixed whitelist is ever sent over the wire. Model configurations
//! are free-form tables, so [`ModelParameters::from_raw`] silently drops
//! unknown keys, nulls, and values of the wrong type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whitelisted request parameters (Value Object)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl ModelParameters {
    /// Names of every key that may be forwarded
    pub const WHITELIST: [&'static str; 9] = [
        "temperature",
        "max_tokens",
        "top_p",
        "top_k",
        "frequency_penalty",
        "presence_penalty",
        "repetition_penalty",
        "seed",
        "user",
    ];

    /// Extract whitelisted parameters from a free-form configuration table
    pub fn from_raw(raw: &Map<String, Value>) -> Self {
        let float = |key: &str| raw.get(key).and_then(Value::as_f64);
        let unsigned = |key: &str| {
            raw.get(key)
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
        };

        Self {
            temperature: float("temperature"),
            max_tokens: unsigned("max_tokens"),
            top_p: float("top_p"),
            top_k: unsigned("top_k"),
            frequency_penalty: float("frequency_penalty"),
            presence_penalty: float("presence_penalty"),
            repetition_penalty: float("repetition_penalty"),
            seed: raw.get("seed").and_then(Value::as_i64),
            user: raw.get("user").and_then(Value::as_str).map(str::to_string),
        }
    }

    /// Fill every unset field from `defaults`; explicit values win
    pub fn or(self, defaults: &ModelParameters) -> Self {
        Self {
            temperature: self.temperature.or(defaults.temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            top_p: self.top_p.or(defaults.top_p),
            top_k: self.top_k.or(defaults.top_k),
            frequency_penalty: self.frequency_penalty.or(defaults.frequency_penalty),
            presence_penalty: self.presence_penalty.or(defaults.presence_penalty),
            repetition_penalty: self.repetition_penalty.or(defaults.repetition_penalty),
            seed: self.seed.or(defaults.seed),
            user: self.user.or_else(|| defaults.user.clone()),
        }
    }

    /// Set the temperature unless one is already configured
    pub fn with_default_temperature(mut self, temperature: f64) -> Self {
        self.temperature.get_or_insert(temperature);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
