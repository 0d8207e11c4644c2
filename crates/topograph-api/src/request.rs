//! Incoming request envelope.

use serde::Deserialize;
use serde_json::Value;
use topograph::domain::{Actor, DataMap};

use crate::error::{ApiError, Result};

/// One request: method, path, parameters and, optionally, who sent it.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    /// HTTP-style method, matched case-insensitively.
    pub method: String,

    /// Route path, e.g. `/getNode`.
    pub path: String,

    /// Request parameters.
    #[serde(default)]
    pub data: DataMap,

    /// Calling user; the configured actor is used when absent.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Caller address; the configured actor's address is used when absent.
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl Request {
    /// Build a request without actor information.
    pub fn new(method: impl Into<String>, path: impl Into<String>, data: DataMap) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            data,
            user_id: None,
            ip_address: None,
        }
    }

    /// Attach the caller.
    #[must_use]
    pub fn with_actor(mut self, actor: &Actor) -> Self {
        self.user_id = Some(actor.user_id.as_str().to_string());
        self.ip_address = Some(actor.ip_address.clone());
        self
    }

    /// The caller, filling gaps from `fallback`.
    pub fn actor(&self, fallback: Actor) -> Actor {
        Actor::new(
            self.user_id.clone().unwrap_or_else(|| fallback.user_id.as_str().to_string()),
            self.ip_address.clone().unwrap_or(fallback.ip_address),
        )
    }

    /// A required parameter. `null` counts as missing.
    pub fn get_param(&self, name: &str) -> Result<&Value> {
        match self.data.get(name) {
            None | Some(Value::Null) => Err(ApiError::missing(name)),
            Some(value) => Ok(value),
        }
    }

    /// A required string parameter.
    pub fn get_str(&self, name: &str) -> Result<&str> {
        let value = self.get_param(name)?;
        value
            .as_str()
            .ok_or_else(|| ApiError::invalid(name, value.to_string(), "a string"))
    }

    /// An optional string parameter.
    pub fn get_opt_str(&self, name: &str) -> Result<Option<&str>> {
        match self.get_str(name) {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::MissingParameter { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// An optional object parameter.
    pub fn get_map(&self, name: &str) -> Result<Option<DataMap>> {
        match self.data.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map.clone())),
            Some(other) => Err(ApiError::invalid(name, other.to_string(), "a JSON object")),
        }
    }

    /// An optional non-negative integer parameter.
    pub fn get_opt_usize(&self, name: &str) -> Result<Option<usize>> {
        match self.data.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| ApiError::invalid(name, value.to_string(), "a non-negative integer")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(data: Value) -> Request {
        let Value::Object(data) = data else {
            panic!("test data must be an object");
        };
        Request::new("GET", "/getNode", data)
    }

    #[test]
    fn get_param_treats_null_as_missing() {
        let req = request(json!({"id": null}));
        assert!(matches!(
            req.get_param("id"),
            Err(ApiError::MissingParameter { name }) if name == "id"
        ));
    }

    #[test]
    fn get_str_rejects_other_types() {
        let req = request(json!({"id": 42}));
        let err = req.get_str("id").unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { .. }));
        assert_eq!(err.code(), 400);
    }

    #[test]
    fn optional_helpers() {
        let req = request(json!({"label": "API", "data": {"x": 1}, "limit": 5}));

        assert_eq!(req.get_opt_str("label").unwrap(), Some("API"));
        assert_eq!(req.get_opt_str("missing").unwrap(), None);
        assert_eq!(req.get_map("data").unwrap().unwrap()["x"], json!(1));
        assert_eq!(req.get_map("missing").unwrap(), None);
        assert_eq!(req.get_opt_usize("limit").unwrap(), Some(5));
    }

    #[test]
    fn get_map_rejects_arrays() {
        let req = request(json!({"data": [1, 2]}));
        assert!(req.get_map("data").is_err());
    }

    #[test]
    fn actor_falls_back_per_field() {
        let req: Request = serde_json::from_value(json!({
            "method": "GET",
            "path": "/getNodes",
            "user_id": "erin",
        }))
        .unwrap();

        let actor = req.actor(Actor::new("local", "127.0.0.1"));
        assert_eq!(actor.user_id.as_str(), "erin");
        assert_eq!(actor.ip_address, "127.0.0.1");
        assert!(req.data.is_empty());
    }
}
