//! In-memory option store for tests and embedding

use super::OptionStore;
use crate::error::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory option storage (not persisted)
#[derive(Default)]
pub struct MemoryStore {
    options: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    /// Create an empty memory store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one option
    #[must_use]
    pub fn with_option(name: impl Into<String>, value: Value) -> Self {
        let mut options = HashMap::new();
        options.insert(name.into(), value);
        Self {
            options: RwLock::new(options),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.options.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.options.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OptionStore for MemoryStore {
    fn get_option(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.read().get(name).cloned())
    }

    fn update_option(&self, name: &str, value: &Value) -> Result<()> {
        self.write().insert(name.to_string(), value.clone());
        Ok(())
    }

    fn delete_option(&self, name: &str) -> Result<()> {
        self.write().remove(name);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
