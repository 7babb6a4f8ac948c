//! Configuration file loading for chatsynth
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CHATSYNTH_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./chatsynth.toml` or `./.chatsynth.toml`
//! 4. Global config: `$XDG_CONFIG_HOME/chatsynth/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileGroupConfig, FileModelEntry, FileOpenRouterConfig, FileOutputConfig,
    FileReplConfig, FileRoundConfig, FileSynthesizerConfig, GroupLookupError,
};
pub use loader::ConfigLoader;
