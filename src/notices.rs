//! Admin notices carried across the post/redirect/get cycle
//!
//! Save and import report their outcome through notices. The POST handler
//! queues them in the option store; the next page render drains and shows them.

use crate::error::{Error, Result};
use crate::store::OptionStore;
use log::warn;
use serde::{Deserialize, Serialize};

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
    Success,
}

impl NoticeLevel {
    /// CSS modifier used by the admin markup
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeLevel::Error => "notice-error",
            NoticeLevel::Success => "notice-success",
        }
    }
}

/// One user-facing message with a stable code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub code: String,
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }

    pub fn success(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            level: NoticeLevel::Success,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl From<&Error> for Notice {
    fn from(err: &Error) -> Self {
        Notice::error(err.notice_code(), err.to_string())
    }
}

/// Pending notices persisted under one option key
pub struct NoticeQueue<'a, B: OptionStore> {
    store: &'a B,
    key: String,
}

impl<'a, B: OptionStore> NoticeQueue<'a, B> {
    pub fn new(store: &'a B, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Pending notices without clearing them
    ///
    /// # Errors
    ///
    /// Returns an error if the option store cannot be read.
    pub fn pending(&self) -> Result<Vec<Notice>> {
        match self.store.get_option(&self.key)? {
            Some(value) => Ok(serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Discarding malformed notice queue '{}': {e}", self.key);
                Vec::new()
            })),
            None => Ok(Vec::new()),
        }
    }

    /// Append notices to the queue
    ///
    /// # Errors
    ///
    /// Returns an error if the option store cannot be read or written.
    pub fn push_all(&self, notices: impl IntoIterator<Item = Notice>) -> Result<()> {
        let mut pending = self.pending()?;
        let before = pending.len();
        pending.extend(notices);
        if pending.len() == before {
            return Ok(());
        }
        self.store
            .update_option(&self.key, &serde_json::to_value(&pending)?)
    }

    /// Append one notice
    ///
    /// # Errors
    ///
    /// Returns an error if the option store cannot be read or written.
    pub fn push(&self, notice: Notice) -> Result<()> {
        self.push_all([notice])
    }

    /// Take every pending notice and clear the queue
    ///
    /// Never fails: a broken queue is logged and shows nothing.
    pub fn drain(&self) -> Vec<Notice> {
        let pending = match self.pending() {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Failed to read notices '{}': {e}", self.key);
                return Vec::new();
            }
        };
        if !pending.is_empty() {
            if let Err(e) = self.store.delete_option(&self.key) {
                warn!("Failed to clear notices '{}': {e}", self.key);
            }
        }
        pending
    }
}
