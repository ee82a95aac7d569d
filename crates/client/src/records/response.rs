//! Typed record shapes and lenient response decoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// One row of the remote table.
///
/// Field values stay as raw JSON: the remote schema is heterogeneous
/// per column (scalars, arrays, attachment lists) and the client does
/// not model it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    /// Server-assigned record identifier.
    #[serde(default)]
    pub id: String,

    /// Field name to field value.
    #[serde(default)]
    pub fields: Map<String, Value>,

    /// Server-side creation timestamp.
    #[serde(rename = "createdTime", default, skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
}

/// One page of a list response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPage {
    #[serde(default)]
    pub records: Vec<Record>,

    /// Continuation token; present when more rows exist. Pass it back
    /// via `ListOptions::offset` to fetch the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

/// Acknowledgement of a delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deleted {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub deleted: bool,
}

/// Decode a raw response into a typed shape.
///
/// Mismatched or null payloads decode to the type's default instead of
/// failing, matching the dispatcher's lenient body handling.
pub(crate) fn decode_lenient<T>(value: Value) -> T
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_value(value) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!("response shape mismatch, substituting default: {}", e);
            T::default()
        }
    }
}

/// Extract the server-provided message from an error body, if any.
///
/// Failures arrive as `{"error": {"type": ..., "message": ...}}`, or
/// occasionally as a bare `{"error": "NOT_FOUND"}` string.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let error = value.get("error")?;

    if let Some(message) = error.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    error.as_str().map(str::to_string)
}
