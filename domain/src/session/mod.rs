//! Chat-completion session domain.
//!
//! - [`entities::ChatRequest`] - one streaming call (model, messages, parameters)
//! - [`entities::Message`] - a single role/content pair
//! - [`params::ModelParameters`] - whitelisted sampling and penalty parameters
//! - [`stream::StreamEvent`] - incremental events of a streaming response

pub mod entities;
pub mod params;
pub mod stream;
