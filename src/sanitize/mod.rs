//! Type-directed cleaning of submitted settings
//!
//! [`Sanitizer`] turns a raw submission into the next settings document. It
//! starts from the stored document and only rewrites the sections that were
//! submitted, so a form that posts one tab never clobbers the others.
//!
//! ```rust
//! use serde_json::json;
//! use tabman::{EventManager, SchemaRegistry, sanitize::Sanitizer};
//!
//! let registry = SchemaRegistry::standard();
//! let events = EventManager::new();
//! let stored = json!({"email": {"enabled": true}});
//!
//! let result = Sanitizer::new(&registry, &events)
//!     .sanitize(&json!({"general": {"service_type": "gold"}}), &stored);
//!
//! assert_eq!(result.document["general"]["service_type"], "basic");
//! assert_eq!(result.document["email"]["enabled"], true);
//! ```

mod text;

pub use text::{kses_post, strip_all_tags, text_field, textarea_field};

use crate::config::{FieldDescriptor, FieldKind, SchemaRegistry};
use crate::events::EventManager;
use crate::notices::Notice;
use log::{debug, warn};
use serde_json::{Map, Value};

/// Outcome of sanitizing one submission
#[derive(Debug, Clone, PartialEq)]
pub struct Sanitized {
    /// The document to persist
    pub document: Value,
    /// Problems found while cleaning (rejected values)
    pub notices: Vec<Notice>,
}

/// Applies the schema to raw submissions
pub struct Sanitizer<'a> {
    registry: &'a SchemaRegistry,
    events: &'a EventManager,
}

impl<'a> Sanitizer<'a> {
    pub fn new(registry: &'a SchemaRegistry, events: &'a EventManager) -> Self {
        Self { registry, events }
    }

    /// Merge a raw submission into `current`
    ///
    /// A submission that is not an object yields an empty document. Sections
    /// missing from the submission keep their stored values; keys the schema
    /// does not declare are ignored.
    pub fn sanitize(&self, raw: &Value, current: &Value) -> Sanitized {
        let Some(raw) = raw.as_object() else {
            warn!("Submitted settings are not an object, resetting to an empty document");
            return Sanitized {
                document: Value::Object(Map::new()),
                notices: Vec::new(),
            };
        };

        let mut document = current.as_object().cloned().unwrap_or_default();
        let mut notices = Vec::new();

        for section in self.registry.sections() {
            if section.is_import_export() {
                continue;
            }
            let Some(submitted) = raw.get(&section.key).filter(|v| !v.is_null()) else {
                continue;
            };
            let empty = Map::new();
            let submitted = submitted.as_object().unwrap_or(&empty);

            let entry = document
                .entry(section.key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(stored) = entry else {
                continue;
            };

            for field in section.fields() {
                match submitted.get(&field.key).filter(|v| !v.is_null()) {
                    Some(value) => {
                        let path = format!("{}.{}", section.key, field.key);
                        let clean = sanitize_value(field, value);
                        match self.events.validate(&path, &clean) {
                            Ok(()) => {
                                stored.insert(field.key.clone(), clean);
                            }
                            Err(message) => {
                                debug!("Rejected value for '{path}': {message}");
                                notices.push(Notice::error(
                                    "invalid_value",
                                    format!("{}: {message}", field.label),
                                ));
                            }
                        }
                    }
                    None if matches!(field.kind, FieldKind::Checkbox { .. }) => {
                        stored.insert(field.key.clone(), Value::Bool(false));
                    }
                    None => {}
                }
            }
        }

        Sanitized {
            document: Value::Object(document),
            notices,
        }
    }
}

/// Clean one submitted value according to its field kind
pub fn sanitize_value(field: &FieldDescriptor, value: &Value) -> Value {
    match &field.kind {
        FieldKind::Text { .. } => Value::String(text_field(&scalar_string(value))),
        FieldKind::Textarea { .. } => Value::String(textarea_field(&scalar_string(value))),
        FieldKind::Editor { .. } => Value::String(kses_post(&scalar_string(value))),
        FieldKind::Checkbox { .. } => Value::Bool(to_bool(value)),
        FieldKind::Select(choices) | FieldKind::Radio(choices) => {
            let candidate = scalar_string(value);
            if !is_composite(value) && choices.contains(&candidate) {
                Value::String(candidate)
            } else {
                Value::String(choices.default.clone())
            }
        }
        FieldKind::Passthrough { .. } => value.clone(),
    }
}

/// Truthiness as form posts encode it
///
/// `""`, `"0"`, `0`, `false`, `null` and empty arrays/objects are false;
/// everything else is true.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// String form of a scalar; composite values and `null` become `""`
pub(crate) fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn is_composite(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}
