//! Validation failures raised while building domain values.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Input rejected by a domain constructor or parser.
///
/// Lookups and authorization live in the store and auth layers; this type only
/// describes values that could never be accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier did not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// The message without its category prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation(m) | Self::InvalidId(m) => m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_strips_the_category() {
        let err = DomainError::validation("name must not be empty");
        assert_eq!(err.to_string(), "validation failed: name must not be empty");
        assert_eq!(err.detail(), "name must not be empty");
        assert_eq!(DomainError::invalid_id("UserId: x").detail(), "UserId: x");
    }
}
