//! Error types for tabman

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tabman operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tabman
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory '{path}': {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete file '{path}': {source}")]
    FileDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Access Errors
    // -------------------------------------------------------------------------
    #[error("You do not have sufficient permissions to {action} settings.")]
    PermissionDenied { action: String },

    #[error("The link you followed has expired (invalid {action} token).")]
    InvalidToken { action: String },

    // -------------------------------------------------------------------------
    // Import / Export Errors
    // -------------------------------------------------------------------------
    #[error("Failed to upload file: {code}")]
    UploadFailed { code: i32 },

    #[error("The uploaded file must be a JSON file (got '{file_name}').")]
    InvalidFileType { file_name: String },

    #[error("The uploaded file contains invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid import file format: {0}")]
    InvalidImport(String),

    #[error("Failed to build export file: {0}")]
    ExportFailed(String),

    // -------------------------------------------------------------------------
    // Schema / Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check if this error must abort the request instead of becoming a notice
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::PermissionDenied { .. } | Error::InvalidToken { .. }
        )
    }

    /// Check if this error came from validating an uploaded import file
    #[must_use]
    pub fn is_import_error(&self) -> bool {
        matches!(
            self,
            Error::UploadFailed { .. }
                | Error::InvalidFileType { .. }
                | Error::InvalidJson(_)
                | Error::InvalidImport(_)
        )
    }

    /// Stable code used when this error is surfaced as an admin notice
    #[must_use]
    pub fn notice_code(&self) -> &'static str {
        match self {
            Error::PermissionDenied { .. } => "insufficient_permissions",
            Error::InvalidToken { .. } => "invalid_token",
            Error::UploadFailed { .. } => "upload_error",
            Error::InvalidFileType { .. } => "invalid_file_type",
            Error::InvalidJson(_) => "invalid_json",
            Error::InvalidImport(_) => "invalid_import",
            Error::ExportFailed(_) => "export_failed",
            _ => "settings_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(
            Error::PermissionDenied {
                action: "import".into()
            }
            .is_fatal()
        );
        assert!(
            Error::InvalidToken {
                action: "export".into()
            }
            .is_fatal()
        );
        assert!(!Error::InvalidJson("eof".into()).is_fatal());
    }

    #[test]
    fn test_notice_codes() {
        assert_eq!(Error::UploadFailed { code: 3 }.notice_code(), "upload_error");
        assert_eq!(
            Error::InvalidFileType {
                file_name: "a.txt".into()
            }
            .notice_code(),
            "invalid_file_type"
        );
        assert_eq!(Error::InvalidJson("x".into()).notice_code(), "invalid_json");
        assert!(Error::InvalidImport("not an object".into()).is_import_error());
    }

    #[test]
    fn test_permission_message() {
        let err = Error::PermissionDenied {
            action: "export".into(),
        };
        assert_eq!(
            err.to_string(),
            "You do not have sufficient permissions to export settings."
        );
    }
}
