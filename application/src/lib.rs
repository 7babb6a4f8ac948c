//! Application layer for chatsynth
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod response_store;
pub mod use_cases;

// Re-export commonly used types
pub use config::RoundParams;
pub use ports::{
    llm_gateway::{ChatCompletionGateway, GatewayError, StreamHandle},
    progress::{NoProgress, ProgressNotifier},
};
pub use response_store::{ResponseStore, ResponseWriter};
pub use use_cases::fan_out::{FanOut, FanOutRound, SessionControls};
pub use use_cases::run_round::{RoundInput, RunRoundError, RunRoundUseCase};
pub use use_cases::synthesize::{EngineState, SynthesisEngine};
