//! Infrastructure layer for chatsynth
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod openrouter;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileGroupConfig, FileOpenRouterConfig, FileOutputConfig,
    FileReplConfig, FileRoundConfig, GroupLookupError,
};
pub use openrouter::{OpenRouterError, OpenRouterGateway, OpenRouterSettings};
