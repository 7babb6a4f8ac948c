//! Synthesis domain - merging several model answers into one.
//!
//! - [`response::ModelResponse`] - per-model result record
//! - [`mode::SynthesisMode`] / [`mode::MergeStrategy`] - merge policies
//! - [`config::SynthesizerConfig`] - synthesizer model, mode and threshold
//! - [`quality::QualityScorer`] - advisory 0–100 response score
//! - [`fallback::FallbackSynthesizer`] - offline merge when the model call fails
//! - [`outcome::SynthesisOutcome`] / [`outcome::RoundResult`] - results

pub mod config;
pub mod fallback;
pub mod locale;
pub mod mode;
pub mod outcome;
pub mod quality;
pub mod response;
