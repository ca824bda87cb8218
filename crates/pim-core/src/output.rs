//! JSON documents written by the CLI
//!
//! Everything goes through `serde_json::Value` first so object keys come out
//! sorted.

use serde::Serialize;
use serde_json::json;

use crate::error::Result;

/// A bare `{"message": ...}` document.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Pretty-printed JSON with sorted keys.
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_string_pretty(&value)?)
}

/// `{"error": "<message>"}`
pub fn error_document(message: &str) -> String {
    let value = json!({ "error": message });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| format!("{{\"error\": {message:?}}}"))
}
