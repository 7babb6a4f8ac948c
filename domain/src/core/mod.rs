//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] - chat-completion model references (OpenRouter ids)
//! - [`question::Question`] - a validated question to fan out
//! - [`error::DomainError`] - domain-level errors

pub mod error;
pub mod model;
pub mod question;
pub mod string;
