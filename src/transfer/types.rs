//! Data types for settings export and import

use crate::notices::Notice;
use serde_json::Value;
use std::path::Path;

/// Transport status of an uploaded file as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Ok,
    /// Host-specific upload error code, surfaced to the user unchanged
    Failed(i32),
}

/// A file attached to the import form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub status: UploadStatus,
    pub contents: Vec<u8>,
}

impl Upload {
    /// A successfully received file
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            status: UploadStatus::Ok,
            contents: contents.into(),
        }
    }

    /// A file the host failed to receive
    pub fn failed(file_name: impl Into<String>, code: i32) -> Self {
        Self {
            file_name: file_name.into(),
            status: UploadStatus::Failed(code),
            contents: Vec::new(),
        }
    }

    /// An empty, successful upload is the same as no file at all
    pub fn is_empty(&self) -> bool {
        self.status == UploadStatus::Ok && self.contents.is_empty()
    }

    /// Check for a `.json` extension (case-insensitive)
    pub fn has_json_extension(&self) -> bool {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

/// A rendered export download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// `settings-export-YYYY-MM-DD.json`
    pub file_name: String,
    /// Pretty-printed JSON with Unicode left unescaped
    pub body: String,
}

impl ExportFile {
    /// Response headers for the download, caching disabled
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".into(), "application/json".into()),
            (
                "Content-Disposition".into(),
                format!("attachment; filename=\"{}\"", self.file_name),
            ),
            (
                "Cache-Control".into(),
                "no-cache, no-store, must-revalidate".into(),
            ),
            ("Pragma".into(), "no-cache".into()),
            ("Expires".into(), "0".into()),
        ]
    }
}

/// What an import replaced
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    /// Document stored before the import
    pub previous: Value,
    /// Document stored by the import
    pub imported: Value,
    /// Values rejected while applying a sanitized import
    pub notices: Vec<Notice>,
}
