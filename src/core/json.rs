//! Purpose: Name the JSON shapes returned by the fetch entry points.
//! Exports: `Json`, `JsonObject`, `JsonList`, `into_object`, `json_type_name`.
//! Role: Thin aliases over `serde_json` plus the opt-in root-shape check.
//! Invariants: `into_object` never inspects below the root.
use serde_json::{Map, Value};

use super::error::{Error, ErrorKind};

/// Any JSON value: null, boolean, number, string, array, or object.
pub type Json = Value;

/// The mapping variant of [`Json`], keyed by string.
pub type JsonObject = Map<String, Json>;

/// The sequence variant of [`Json`].
pub type JsonList = Vec<Json>;

pub fn json_type_name(value: &Json) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Unwraps a decoded root into an object, or fails with [`ErrorKind::Shape`].
pub fn into_object(value: Json) -> Result<JsonObject, Error> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::new(ErrorKind::Shape)
            .with_message(format!(
                "expected json object at root, found {}",
                json_type_name(&other)
            ))
            .with_hint("Use the non-object entry point to accept any JSON root.")),
    }
}
