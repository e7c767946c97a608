//! Whole-document export and import
//!
//! Export writes the stored document as a dated JSON download. Import replaces
//! the stored document with an uploaded JSON object. Both require the admin
//! capability and a token scoped to their action, and a failed import leaves
//! the store untouched.

mod export;
mod import;
mod types;

pub use export::build_export;
pub use import::parse_upload;
pub use types::{ExportFile, ImportReport, Upload, UploadStatus};

use crate::auth::{Caller, TokenAction, TokenIssuer};
use crate::config::ImportPolicy;
use crate::error::{Error, Result};
use crate::sanitize::Sanitizer;
use crate::store::{OptionStore, SettingsStore};
use log::info;
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Export/import handler bound to one settings store
pub struct Transfer<'a, B: OptionStore> {
    store: &'a SettingsStore<B>,
    tokens: &'a TokenIssuer,
    capability: &'a str,
    policy: ImportPolicy,
    sanitizer: Sanitizer<'a>,
}

impl<'a, B: OptionStore> Transfer<'a, B> {
    pub fn new(
        store: &'a SettingsStore<B>,
        tokens: &'a TokenIssuer,
        capability: &'a str,
        policy: ImportPolicy,
        sanitizer: Sanitizer<'a>,
    ) -> Self {
        Self {
            store,
            tokens,
            capability,
            policy,
            sanitizer,
        }
    }

    fn authorize(&self, caller: &Caller, action: TokenAction, token: &str) -> Result<()> {
        if !caller.can(self.capability) {
            return Err(Error::PermissionDenied {
                action: action.to_string(),
            });
        }
        if !self.tokens.verify(action, caller.user_id, token) {
            return Err(Error::InvalidToken {
                action: action.to_string(),
            });
        }
        Ok(())
    }

    /// Build the export download of the stored document
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` or `InvalidToken` for an unauthorized caller,
    /// or a store/formatting error.
    pub fn export(&self, caller: &Caller, token: &str) -> Result<ExportFile> {
        self.authorize(caller, TokenAction::Export, token)?;

        let document = self.store.load()?;
        let file = build_export(&document, OffsetDateTime::now_utc().date())?;
        info!(
            "User {} exported settings '{}' as {}",
            caller.user_id,
            self.store.option_name(),
            file.file_name
        );
        Ok(file)
    }

    /// Replace the stored document with an uploaded one
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` or `InvalidToken` for an unauthorized caller,
    /// an upload validation error, or a store error. The store is only written
    /// once every check has passed.
    pub fn import(&self, caller: &Caller, token: &str, upload: &Upload) -> Result<ImportReport> {
        self.authorize(caller, TokenAction::Import, token)?;

        let uploaded = parse_upload(upload)?;
        let (imported, notices) = match self.policy {
            ImportPolicy::Verbatim => (uploaded, Vec::new()),
            ImportPolicy::Sanitized => {
                let result = self
                    .sanitizer
                    .sanitize(&uploaded, &Value::Object(Map::new()));
                (result.document, result.notices)
            }
        };

        let previous = self.store.load()?;
        self.store.save(&imported)?;
        info!(
            "User {} imported settings '{}' from {} ({:?} policy)",
            caller.user_id,
            self.store.option_name(),
            upload.file_name,
            self.policy
        );

        Ok(ImportReport {
            previous,
            imported,
            notices,
        })
    }
}
