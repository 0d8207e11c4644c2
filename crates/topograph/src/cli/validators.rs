//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is rejected at
//! parse time.

use crate::domain::DataMap;

/// Validate an entity id: non-empty after trimming, no whitespace inside.
pub fn validate_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("ID cannot be empty".to_string());
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("ID '{s}' cannot contain whitespace"));
    }

    Ok(s.to_string())
}

/// Validate a display label or project name.
pub fn validate_label(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Label cannot be empty".to_string());
    }
    Ok(s.to_string())
}

/// Parse a JSON object given on the command line into a data map.
pub fn parse_data(s: &str) -> Result<DataMap, String> {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("Data must be a JSON object, got: {other}")),
        Err(e) => Err(format!("Invalid JSON: {e}")),
    }
}
