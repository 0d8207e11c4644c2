//! Error types for the topograph request boundary.

use thiserror::Error;

/// Errors a request handler can end with.
///
/// Each variant maps to an HTTP-style status code via [`ApiError::code`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required request parameter was not supplied.
    #[error("Missing required parameter: {name}")]
    MissingParameter {
        /// Name of the absent parameter.
        name: String,
    },

    /// A parameter was present but unusable.
    #[error("Invalid {field}: '{value}'. Valid values: {valid_values}")]
    InvalidArgument {
        /// The parameter name.
        field: String,
        /// The rejected value, rendered as text.
        value: String,
        /// Description of the accepted values.
        valid_values: &'static str,
    },

    /// The path is routed but not for this method.
    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed {
        /// Method the request used.
        method: String,
        /// Requested path.
        path: String,
    },

    /// No handler is registered for the path.
    #[error("No route for {path}")]
    NotFound {
        /// Requested path.
        path: String,
    },

    /// An error from the topograph core.
    #[error(transparent)]
    Core(#[from] topograph::error::Error),
}

impl ApiError {
    /// Shorthand for [`ApiError::MissingParameter`].
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Shorthand for [`ApiError::InvalidArgument`].
    pub fn invalid(field: impl Into<String>, value: impl Into<String>, valid_values: &'static str) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            value: value.into(),
            valid_values,
        }
    }

    /// HTTP-style status code for this error.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::MissingParameter { .. } | Self::InvalidArgument { .. } => 400,
            Self::Core(err) if err.is_validation() => 400,
            Self::NotFound { .. } => 404,
            Self::MethodNotAllowed { .. } => 405,
            Self::Core(_) => 500,
        }
    }
}

/// Result type for request handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
