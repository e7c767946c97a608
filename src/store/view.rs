//! Request-scoped settings accessor
//!
//! A [`SettingsView`] reads the document at most once and answers every lookup
//! of the request from that copy. It does not observe writes made after the
//! first read; start a new view for that.

use super::{OptionStore, SettingsStore};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::cell::OnceCell;

/// Memoized, never-failing view of the settings document
pub struct SettingsView<'a, B: OptionStore> {
    store: &'a SettingsStore<B>,
    cached: OnceCell<Value>,
}

impl<'a, B: OptionStore> SettingsView<'a, B> {
    pub(crate) fn new(store: &'a SettingsStore<B>) -> Self {
        Self {
            store,
            cached: OnceCell::new(),
        }
    }

    /// The whole document
    ///
    /// A store read failure is logged and treated as an empty document.
    pub fn document(&self) -> &Value {
        self.cached.get_or_init(|| match self.store.load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(
                    "Failed to read option '{}', using empty document: {e}",
                    self.store.option_name()
                );
                Value::Object(Map::new())
            }
        })
    }

    /// Look up a dotted path (e.g. `"email.enabled"`)
    pub fn get(&self, path: &str) -> Option<&Value> {
        lookup(self.document(), path)
    }

    /// Look up a dotted path, falling back to `default` when any segment is missing
    pub fn get_or(&self, path: &str, default: impl Into<Value>) -> Value {
        self.get(path).cloned().unwrap_or_else(|| default.into())
    }

    /// Look up and deserialize a dotted path, falling back to `default`
    ///
    /// A value that does not deserialize into `T` also yields `default`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get(path)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }
}

/// Walk `path` through nested objects (and arrays by numeric index)
///
/// Returns `None` as soon as a segment is absent or `null`; there is no
/// partial result.
pub fn lookup<'v>(document: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = document;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
        if current.is_null() {
            return None;
        }
    }
    Some(current)
}
