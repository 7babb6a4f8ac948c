//! Application-level configuration.
//!
//! - [`RoundParams`] - round control (timeout, target language, hedge lexicon)

pub mod round_params;

pub use round_params::RoundParams;
