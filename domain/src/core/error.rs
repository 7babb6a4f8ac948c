//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Intersection threshold must be a positive integer, got {0}")]
    InvalidThreshold(i64),

    #[error("Model group '{0}' has no models")]
    EmptyGroup(String),

    #[error("Model group '{group}' uses the id '{id}' more than once")]
    DuplicateModelId { group: String, id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_error_display() {
        let error = DomainError::InvalidThreshold(0);
        assert_eq!(
            error.to_string(),
            "Intersection threshold must be a positive integer, got 0"
        );
    }

    #[test]
    fn test_empty_group_display() {
        let error = DomainError::EmptyGroup("research".to_string());
        assert_eq!(error.to_string(), "Model group 'research' has no models");
    }
}
