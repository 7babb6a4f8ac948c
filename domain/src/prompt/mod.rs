//! Prompt domain
//!
//! Synthesis prompt templates and the parser for their identity tags.

pub mod parsing;
mod template;

pub use parsing::{ModelTag, extract_model_ids, extract_model_tags};
pub use template::{PromptTemplate, SynthesisPrompt};
