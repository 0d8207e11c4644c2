//! Outgoing response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Whether a request succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// 2xx
    Success,
    /// Anything else
    Error,
}

/// Result of one request, as written back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// HTTP-style status code.
    pub code: u16,
    /// `success` or `error`.
    pub status: ResponseStatus,
    /// Human-readable summary.
    pub message: String,
    /// Payload; `null` for errors.
    pub data: Value,
}

impl Response {
    /// A 200 response carrying `data`.
    pub fn ok(message: impl Into<String>, data: impl Serialize) -> Self {
        Self::success(200, message, data)
    }

    /// A 201 response carrying the created entity.
    pub fn created(message: impl Into<String>, data: impl Serialize) -> Self {
        Self::success(201, message, data)
    }

    /// A successful response with an explicit code.
    ///
    /// A payload that fails to serialize turns the response into a 500.
    pub fn success(code: u16, message: impl Into<String>, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                code,
                status: ResponseStatus::Success,
                message: message.into(),
                data,
            },
            Err(err) => {
                tracing::warn!(error = %err, "Response payload could not be serialized");
                Self::error(500, format!("serialization error: {err}"))
            }
        }
    }

    /// An error response.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            status: ResponseStatus::Error,
            message: message.into(),
            data: Value::Null,
        }
    }

    /// Whether the status is `success`.
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl From<ApiError> for Response {
    fn from(err: ApiError) -> Self {
        Self::error(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_envelope() {
        let response = Response::ok("2 nodes", vec!["a", "b"]);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"code": 200, "status": "success", "message": "2 nodes", "data": ["a", "b"]})
        );
    }

    #[test]
    fn errors_carry_code_and_null_data() {
        let response = Response::from(ApiError::missing("id"));
        assert_eq!(response.code, 400);
        assert_eq!(response.status, ResponseStatus::Error);
        assert!(response.data.is_null());
        assert!(!response.is_success());
    }
}
