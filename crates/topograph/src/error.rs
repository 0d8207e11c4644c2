//! Error types for topograph operations.
//!
//! Absence is never an error here: repository reads return `Option`,
//! `bool` or an empty `Vec`. The variants below cover storage faults,
//! invalid values handed to the core, and configuration problems.

use std::io;
use thiserror::Error;

/// The error type for topograph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored or supplied payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// No `.topograph/` directory in the working directory or its parents.
    #[error("Not a topograph repository (or any parent directory). Run 'topograph init' first.")]
    NotInitialized,

    /// A value failed validation, e.g. an unknown category or status.
    #[error("invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidValue {
        /// The field that carried the offending value.
        field: &'static str,
        /// The value that was rejected.
        value: String,
        /// Description of the accepted values.
        valid_values: &'static str,
    },

    /// Internal invariant broken (poisoned lock, clock before epoch, ...).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidValue`].
    pub fn invalid(field: &'static str, value: impl Into<String>, valid_values: &'static str) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
            valid_values,
        }
    }

    /// Returns `true` for faults caused by the caller's input rather than
    /// by storage or infrastructure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidValue { .. })
    }
}

/// A specialized Result type for topograph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_value_names_field_and_choices() {
        let err = Error::invalid("category", "cloud", "business, application, infrastructure");

        let msg = err.to_string();
        assert!(msg.contains("category"));
        assert!(msg.contains("'cloud'"));
        assert!(msg.contains("infrastructure"));
        assert!(err.is_validation());
    }

    #[test]
    fn storage_faults_are_not_validation() {
        let err = Error::from(rusqlite::Error::InvalidQuery);
        assert!(!err.is_validation());
        assert!(err.to_string().starts_with("database error"));
    }
}
