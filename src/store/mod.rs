//! Option stores and the settings document accessor
//!
//! The host supplies a generic key-value [`OptionStore`]. [`SettingsStore`]
//! binds one of its keys to the settings document, and [`SettingsView`] is the
//! request-scoped, read-memoized accessor the renderer uses.

#[cfg(feature = "file-store")]
mod file;
mod memory;
mod view;

#[cfg(feature = "file-store")]
pub use file::FileStore;
pub use memory::MemoryStore;
pub use view::{SettingsView, lookup};

use crate::error::Result;
use log::debug;
use serde_json::{Map, Value};

/// Host-provided key-value configuration store
///
/// Values are opaque JSON documents; the store enforces no schema.
pub trait OptionStore: Send + Sync {
    /// Read an option, `None` if it was never written
    fn get_option(&self, name: &str) -> Result<Option<Value>>;

    /// Create or replace an option
    fn update_option(&self, name: &str, value: &Value) -> Result<()>;

    /// Remove an option; removing a missing option is not an error
    fn delete_option(&self, name: &str) -> Result<()>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

impl<T: OptionStore + ?Sized> OptionStore for std::sync::Arc<T> {
    fn get_option(&self, name: &str) -> Result<Option<Value>> {
        (**self).get_option(name)
    }

    fn update_option(&self, name: &str, value: &Value) -> Result<()> {
        (**self).update_option(name, value)
    }

    fn delete_option(&self, name: &str) -> Result<()> {
        (**self).delete_option(name)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

/// The settings document stored under one well-known option key
pub struct SettingsStore<B: OptionStore> {
    backend: B,
    option_name: String,
}

impl<B: OptionStore> SettingsStore<B> {
    pub fn new(backend: B, option_name: impl Into<String>) -> Self {
        Self {
            backend,
            option_name: option_name.into(),
        }
    }

    /// Option key of the document
    pub fn option_name(&self) -> &str {
        &self.option_name
    }

    /// Underlying option store
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the whole document; a document that was never saved reads as `{}`
    ///
    /// # Errors
    ///
    /// Returns an error if the option store cannot be read.
    pub fn load(&self) -> Result<Value> {
        match self.backend.get_option(&self.option_name)? {
            Some(doc) => Ok(doc),
            None => {
                debug!("Option '{}' not set yet, using empty document", self.option_name);
                Ok(Value::Object(Map::new()))
            }
        }
    }

    /// Replace the whole document
    ///
    /// # Errors
    ///
    /// Returns an error if the option store cannot be written.
    pub fn save(&self, document: &Value) -> Result<()> {
        self.backend.update_option(&self.option_name, document)?;
        debug!(
            "Saved option '{}' via {} store",
            self.option_name,
            self.backend.backend_name()
        );
        Ok(())
    }

    /// Start a request-scoped view with a memoized read
    pub fn view(&self) -> SettingsView<'_, B> {
        SettingsView::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_absent_document_is_empty_object() {
        let store = SettingsStore::new(MemoryStore::new(), "opts");
        assert_eq!(store.load().unwrap(), json!({}));
    }

    #[test]
    fn test_save_then_load() {
        let store = SettingsStore::new(MemoryStore::new(), "opts");
        let doc = json!({"general": {"api_key": "abc"}});

        store.save(&doc).unwrap();

        assert_eq!(store.load().unwrap(), doc);
        assert_eq!(store.backend().get_option("opts").unwrap(), Some(doc));
    }

    #[test]
    fn test_shared_backend_through_arc() {
        let backend = std::sync::Arc::new(MemoryStore::new());
        let store = SettingsStore::new(backend.clone(), "opts");

        store.save(&json!({"a": {}})).unwrap();
        assert!(backend.get_option("opts").unwrap().is_some());
    }
}
