//! Model groups - which models answer and who merges.

pub mod entities;

pub use entities::{ModelConfig, ModelGroup};
