//! Domain layer for chatsynth
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Synthesis round
//!
//! One question is fanned out to every model of a [`ModelGroup`]. Each model
//! fills one [`ModelResponse`]; the completed ones are merged by a designated
//! synthesizer model according to a [`SynthesisMode`]:
//!
//! - **Union** (default): keep everything, drop duplicates, flag conflicts
//! - **Intersection**: keep only content corroborated by a threshold of models
//! - **Selective**: keep only the most valuable content
//!
//! When the merge call fails the [`FallbackSynthesizer`] produces a
//! deterministic offline merge, so a round always ends with some text.

pub mod config;
pub mod core;
pub mod group;
pub mod prompt;
pub mod session;
pub mod synthesis;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{error::DomainError, model::Model, question::Question};
pub use group::{ModelConfig, ModelGroup};
pub use prompt::{ModelTag, PromptTemplate, SynthesisPrompt, extract_model_ids, extract_model_tags};
pub use session::{
    entities::{ChatRequest, Message, Role},
    params::ModelParameters,
    stream::StreamEvent,
};
pub use synthesis::{
    config::SynthesizerConfig,
    fallback::FallbackSynthesizer,
    locale::Locale,
    mode::{MergeStrategy, SynthesisMode, UnknownModeError, derived_threshold},
    outcome::{RoundResult, ScoredResponse, SynthesisOutcome},
    quality::QualityScorer,
    response::ModelResponse,
};
