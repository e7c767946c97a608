//! Change listeners and field validators
//!
//! Listeners fire after a save or import has been persisted, once per field
//! whose value changed. Validators run inside the sanitizer, after the
//! type-directed cleaning, and can veto a submitted value.

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// Type alias for a change callback receiving (`section.key`, old, new)
pub type ChangeCallback = Arc<dyn Fn(&str, &Value, &Value) + Send + Sync>;

/// Type alias for a validator function
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Manages change listeners and validators keyed by `section.key` paths
#[derive(Default)]
pub struct EventManager {
    global_listeners: RwLock<Vec<ChangeCallback>>,
    key_listeners: RwLock<HashMap<String, Vec<ChangeCallback>>>,
    validators: RwLock<HashMap<String, Vec<Validator>>>,
}

impl EventManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called for every changed field
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&str, &Value, &Value) + Send + Sync + 'static,
    {
        self.global_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// Register a listener for one field path (e.g. `"email.enabled"`)
    pub fn watch<F>(&self, path: &str, callback: F)
    where
        F: Fn(&str, &Value, &Value) + Send + Sync + 'static,
    {
        self.key_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Register a validator for one field path
    ///
    /// A rejected value is not stored; the previous value is kept and the
    /// message is shown to the user.
    pub fn add_validator<F>(&self, path: &str, validator: F)
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validators
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default()
            .push(Arc::new(validator));
    }

    /// Run the validators for `path`
    ///
    /// # Errors
    ///
    /// Returns the first validation error message if any validator fails.
    pub fn validate(&self, path: &str, value: &Value) -> Result<(), String> {
        let guard = self
            .validators
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(validators) = guard.get(path) {
            for validator in validators {
                validator(value)?;
            }
        }
        Ok(())
    }

    /// Notify listeners about one changed field
    pub fn notify(&self, path: &str, old_value: &Value, new_value: &Value) {
        // Clone out of the locks so a callback may register further listeners.
        let global: Vec<ChangeCallback> = self
            .global_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let keyed: Vec<ChangeCallback> = self
            .key_listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .unwrap_or_default();

        for callback in global.iter().chain(keyed.iter()) {
            callback(path, old_value, new_value);
        }
    }

    /// Diff two documents at field level and notify each change
    ///
    /// Returns the number of changed fields.
    pub fn notify_changes(&self, old_doc: &Value, new_doc: &Value) -> usize {
        let changes = diff_documents(old_doc, new_doc);
        for (path, old, new) in &changes {
            self.notify(path, old, new);
        }
        changes.len()
    }

    /// Remove all listeners for one path
    pub fn unwatch(&self, path: &str) {
        self.key_listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }
}

/// Field-level differences as (`section.key`, old, new); missing values are `null`
///
/// Top-level entries that are not objects are compared as a whole under the
/// section key.
pub fn diff_documents(old_doc: &Value, new_doc: &Value) -> Vec<(String, Value, Value)> {
    static NULL: Value = Value::Null;
    let empty = Map::new();
    let old_map = old_doc.as_object().unwrap_or(&empty);
    let new_map = new_doc.as_object().unwrap_or(&empty);

    let sections: BTreeSet<&String> = old_map.keys().chain(new_map.keys()).collect();
    let mut changes = Vec::new();

    for section in sections {
        let old_section = old_map.get(section).unwrap_or(&NULL);
        let new_section = new_map.get(section).unwrap_or(&NULL);
        if old_section == new_section {
            continue;
        }

        match (old_section.as_object(), new_section.as_object()) {
            (old_fields, new_fields) if old_fields.is_some() || new_fields.is_some() => {
                let old_fields = old_fields.unwrap_or(&empty);
                let new_fields = new_fields.unwrap_or(&empty);
                let keys: BTreeSet<&String> = old_fields.keys().chain(new_fields.keys()).collect();
                for key in keys {
                    let old = old_fields.get(key).cloned().unwrap_or(Value::Null);
                    let new = new_fields.get(key).cloned().unwrap_or(Value::Null);
                    if old != new {
                        changes.push((format!("{section}.{key}"), old, new));
                    }
                }
            }
            _ => changes.push((section.clone(), old_section.clone(), new_section.clone())),
        }
    }

    changes
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_global_listener() {
        let events = EventManager::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        events.on_change(move |_path, _old, _new| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        events.notify("general.api_key", &json!(null), &json!("k"));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_watch_only_fires_for_its_path() {
        let events = EventManager::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        events.watch("email.enabled", move |_path, _old, _new| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        events.notify("email.enabled", &json!(false), &json!(true));
        events.notify("email.template", &json!("a"), &json!("b"));
        events.unwatch("email.enabled");
        events.notify("email.enabled", &json!(true), &json!(false));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validator() {
        let events = EventManager::new();
        events.add_validator("general.api_key", |value| {
            match value.as_str() {
                Some(s) if s.len() == 32 || s.is_empty() => Ok(()),
                _ => Err("API key must be 32 characters".into()),
            }
        });

        assert!(events.validate("general.api_key", &json!("")).is_ok());
        assert!(events.validate("general.api_key", &json!("short")).is_err());
        assert!(events.validate("general.other", &json!("anything")).is_ok());
    }

    #[test]
    fn test_diff_documents() {
        let old = json!({
            "general": {"api_key": "a", "service_type": "basic"},
            "email": {"enabled": true},
        });
        let new = json!({
            "general": {"api_key": "b", "service_type": "basic"},
            "extra": 5,
        });

        let changes = diff_documents(&old, &new);

        assert_eq!(
            changes,
            vec![
                ("email.enabled".to_string(), json!(true), json!(null)),
                ("extra".to_string(), json!(null), json!(5)),
                ("general.api_key".to_string(), json!("a"), json!("b")),
            ]
        );
    }

    #[test]
    fn test_notify_changes_counts() {
        let events = EventManager::new();
        let seen = Arc::new(RwLock::new(Vec::new()));
        let seen_clone = seen.clone();
        events.on_change(move |path, _old, _new| {
            if let Ok(mut s) = seen_clone.write() {
                s.push(path.to_string());
            }
        });

        let count = events.notify_changes(&json!({}), &json!({"email": {"enabled": true}}));

        assert_eq!(count, 1);
        assert_eq!(*seen.read().unwrap(), vec!["email.enabled".to_string()]);
    }
}
