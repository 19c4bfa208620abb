//! Upload request and its boundary validation.
//!
//! Callers hand the pipeline a loosely-typed message map:
//!
//! ```json
//! {
//!   "type": 1,
//!   "files": ["/storage/DCIM/a.jpg"],
//!   "forcedDir": "shared",
//!   "deviceId": "pixel-7",
//!   "baseDirectory": "/storage/DCIM",
//!   "serverAddress": "http://192.168.1.5:8080"
//! }
//! ```
//!
//! It is checked field by field once, here, and never again downstream.

use serde_json::{Map, Value};

use crate::error::UploadError;

/// A validated upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Category tag copied into every descriptor's `type` field.
    pub category: i64,
    /// Files to upload, in envelope order.
    pub file_paths: Vec<String>,
    /// Overrides base-directory confinement and becomes every descriptor's `dir`.
    pub forced_directory: Option<String>,
    /// Sent verbatim in the `deviceId` header.
    pub device_id: String,
    /// Trusted root that paths must live under when no directory is forced.
    pub base_directory: String,
    /// Server origin, e.g. `http://192.168.1.5:8080`.
    pub server_address: String,
}

impl UploadRequest {
    /// Creates a request confined to `base_directory`.
    pub fn new(
        category: i64,
        file_paths: Vec<String>,
        device_id: impl Into<String>,
        base_directory: impl Into<String>,
        server_address: impl Into<String>,
    ) -> Self {
        Self {
            category,
            file_paths,
            forced_directory: None,
            device_id: device_id.into(),
            base_directory: base_directory.into(),
            server_address: server_address.into(),
        }
    }

    /// Forces the descriptor directory and lifts base-directory confinement.
    pub fn with_forced_directory(mut self, dir: impl Into<String>) -> Self {
        self.forced_directory = Some(dir.into());
        self
    }

    /// Parses a JSON message string.
    pub fn from_json(message: &str) -> Result<Self, UploadError> {
        let value: Value = serde_json::from_str(message).map_err(UploadError::MalformedMessage)?;
        Self::from_value(&value)
    }

    /// Validates an already-parsed message map.
    pub fn from_value(value: &Value) -> Result<Self, UploadError> {
        let map = value
            .as_object()
            .ok_or_else(|| UploadError::mismatch("message", "JSON object"))?;

        let category = number_field(map, "type")?;
        let file_paths = string_list_field(map, "files")?;

        // An empty override is the caller's way of saying "none".
        let forced_directory = match map.get("forcedDir") {
            None => None,
            Some(Value::String(dir)) if dir.is_empty() => None,
            Some(Value::String(dir)) => Some(dir.clone()),
            Some(_) => return Err(UploadError::mismatch("forcedDir", "string")),
        };

        Ok(Self {
            category,
            file_paths,
            forced_directory,
            device_id: string_field(map, "deviceId")?,
            base_directory: string_field(map, "baseDirectory")?,
            server_address: string_field(map, "serverAddress")?,
        })
    }

    /// Returns the forced directory, treating an empty one as absent.
    pub fn forced_directory(&self) -> Option<&str> {
        self.forced_directory.as_deref().filter(|dir| !dir.is_empty())
    }
}

/// Reads a numeric field. Fractions truncate toward zero, since callers send
/// every number as a double.
fn number_field(map: &Map<String, Value>, key: &'static str) -> Result<i64, UploadError> {
    let value = map.get(key);
    value
        .and_then(Value::as_i64)
        .or_else(|| value.and_then(Value::as_f64).map(|f| f as i64))
        .ok_or_else(|| UploadError::mismatch(key, "number"))
}

fn string_field(map: &Map<String, Value>, key: &'static str) -> Result<String, UploadError> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| UploadError::mismatch(key, "string"))
}

fn string_list_field(
    map: &Map<String, Value>,
    key: &'static str,
) -> Result<Vec<String>, UploadError> {
    let items = map
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| UploadError::mismatch(key, "array of strings"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| UploadError::mismatch(key, "array of strings"))
        })
        .collect()
}
