//! Interactive chat module
//!
//! Provides a reedline-based interactive chat interface for synthesis rounds.

mod repl;

pub use repl::ChatRepl;
