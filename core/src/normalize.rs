//! Response normalization shared by every endpoint.
//!
//! A raw body goes through one parse-or-fail branch. Syntax errors and
//! truncated input are `Malformed`; valid JSON that lacks the field an
//! endpoint asked for, or whose root is not an object, is `UnexpectedShape`.
//! Endpoints extract into `Payload`, which accepts a present field of any
//! shape. Both are server failures, regardless of what HTTP
//! status the body arrived with. Nothing here panics.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::NormalizeError;

/// Parse `body` as a JSON object.
pub fn normalize(body: &str) -> Result<Map<String, Value>, NormalizeError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(NormalizeError::UnexpectedShape {
            field: "<root>",
            detail: format!("expected an object, found {}", kind(&other)),
        }),
        Err(e) => Err(NormalizeError::Malformed(e.to_string())),
    }
}

/// Parse `body` and deserialize the top-level `field` into `T`.
pub fn extract<T: DeserializeOwned>(body: &str, field: &'static str) -> Result<T, NormalizeError> {
    let mut map = normalize(body)?;
    let value = map.remove(field).ok_or_else(|| NormalizeError::UnexpectedShape {
        field,
        detail: "field is missing".to_string(),
    })?;
    serde_json::from_value(value).map_err(|e| NormalizeError::UnexpectedShape {
        field,
        detail: e.to_string(),
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
