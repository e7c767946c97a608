//! Upload validation for settings import

use super::types::{Upload, UploadStatus};
use crate::error::{Error, Result};
use serde_json::Value;

/// Validate an upload and decode it into a settings document
///
/// Checks run in order: transport status, `.json` extension, JSON syntax,
/// object shape. The first failure wins.
///
/// # Errors
///
/// Returns `UploadFailed`, `InvalidFileType`, `InvalidJson` or `InvalidImport`.
pub fn parse_upload(upload: &Upload) -> Result<Value> {
    if let UploadStatus::Failed(code) = upload.status {
        return Err(Error::UploadFailed { code });
    }

    if !upload.has_json_extension() {
        return Err(Error::InvalidFileType {
            file_name: upload.file_name.clone(),
        });
    }

    let value: Value =
        serde_json::from_slice(&upload.contents).map_err(|e| Error::InvalidJson(e.to_string()))?;

    if !value.is_object() {
        return Err(Error::InvalidImport(format!(
            "expected a JSON object, found {}",
            json_kind(&value)
        )));
    }

    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
