//! Model value object representing a chat-completion model reference

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A model reference as understood by the chat-completion backend (Value Object)
///
/// Well-known OpenRouter models get their own variant so that display names
/// and provider families are available without a catalog lookup. Any other
/// `vendor/model` identifier is carried verbatim in [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // OpenAI
    Gpt4o,
    Gpt4oMini,
    // Anthropic
    Claude35Sonnet,
    Claude3Haiku,
    // Google
    GeminiPro15,
    GeminiFlash15,
    // Meta
    Llama32Vision90b,
    // Mistral
    MistralLarge,
    // Anything else routed by the backend
    Custom(String),
}

impl Model {
    /// Get the backend identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "openai/gpt-4o",
            Model::Gpt4oMini => "openai/gpt-4o-mini",
            Model::Claude35Sonnet => "anthropic/claude-3.5-sonnet",
            Model::Claude3Haiku => "anthropic/claude-3-haiku",
            Model::GeminiPro15 => "google/gemini-pro-1.5",
            Model::GeminiFlash15 => "google/gemini-flash-1.5",
            Model::Llama32Vision90b => "meta-llama/llama-3.2-90b-vision-instruct",
            Model::MistralLarge => "mistralai/mistral-large",
            Model::Custom(s) => s,
        }
    }

    /// Human readable name used when no display name is configured
    pub fn display_name(&self) -> &str {
        match self {
            Model::Gpt4o => "GPT-4O",
            Model::Gpt4oMini => "GPT-4O Mini",
            Model::Claude35Sonnet => "Claude 3.5 Sonnet",
            Model::Claude3Haiku => "Claude 3 Haiku",
            Model::GeminiPro15 => "Gemini Pro 1.5",
            Model::GeminiFlash15 => "Gemini Flash 1.5",
            Model::Llama32Vision90b => "Llama 3.2 90B Vision",
            Model::MistralLarge => "Mistral Large",
            Model::Custom(s) => s,
        }
    }

    /// Provider prefix of the identifier (`openai`, `anthropic`, ...)
    pub fn provider(&self) -> &str {
        self.as_str().split('/').next().unwrap_or_default()
    }

    /// Models used for an ad-hoc round when nothing is configured
    pub fn default_models() -> Vec<Model> {
        vec![Model::Gpt4oMini, Model::Claude3Haiku, Model::GeminiFlash15]
    }

    /// All well-known models
    pub fn popular() -> Vec<Model> {
        vec![
            Model::Gpt4o,
            Model::Gpt4oMini,
            Model::Claude35Sonnet,
            Model::Claude3Haiku,
            Model::GeminiPro15,
            Model::GeminiFlash15,
            Model::Llama32Vision90b,
            Model::MistralLarge,
        ]
    }
}

impl Default for Model {
    /// Returns the default synthesizer model (GPT-4O Mini)
    fn default() -> Self {
        Model::Gpt4oMini
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "openai/gpt-4o" => Model::Gpt4o,
            "openai/gpt-4o-mini" => Model::Gpt4oMini,
            "anthropic/claude-3.5-sonnet" => Model::Claude35Sonnet,
            "anthropic/claude-3-haiku" => Model::Claude3Haiku,
            "google/gemini-pro-1.5" => Model::GeminiPro15,
            "google/gemini-flash-1.5" => Model::GeminiFlash15,
            "meta-llama/llama-3.2-90b-vision-instruct" => Model::Llama32Vision90b,
            "mistralai/mistral-large" => Model::MistralLarge,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
