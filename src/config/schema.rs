//! Declarative field schema for the settings page
//!
//! # Overview
//!
//! The schema is an ordered list of [`SectionDescriptor`]s. Each section becomes
//! one tab of the admin page and one top-level key of the settings document.
//! Each [`FieldDescriptor`] inside a section describes a single stored value:
//! its label, key, control kind and default.
//!
//! The control kind is a closed enum ([`FieldKind`]). Payloads live on the
//! variant that needs them, so an option list can only exist on `Select` and
//! `Radio` fields and a checkbox default is always a `bool`.
//!
//! ```rust
//! use tabman::{FieldDescriptor, SchemaRegistry, SectionDescriptor, opt};
//!
//! let registry = SchemaRegistry::new(vec![
//!     SectionDescriptor::new("general", "General Settings")
//!         .field(FieldDescriptor::text("API Key", "api_key", "")
//!             .description("Enter your API key here"))
//!         .field(FieldDescriptor::select("Service Type", "service_type", "basic", vec![
//!             opt("basic", "Basic Service"),
//!             opt("premium", "Premium Service"),
//!         ])),
//!     SectionDescriptor::import_export("Import/Export"),
//! ])?;
//!
//! assert_eq!(registry.first().key, "general");
//! # Ok::<(), tabman::Error>(())
//! ```

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Section key of the built-in import/export tab
pub const IMPORT_EXPORT_SECTION: &str = "import_export";

// =============================================================================
// Options
// =============================================================================

/// One selectable value of a select or radio field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingOption {
    /// Value to store
    pub value: String,
    /// Display label
    pub label: String,
}

impl SettingOption {
    /// Create an option
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Shorthand for creating a `SettingOption`
///
/// # Example
/// ```rust
/// use tabman::opt;
/// let options = vec![opt("instant", "Instant"), opt("daily", "Daily Digest")];
/// ```
pub fn opt(value: impl Into<String>, label: impl Into<String>) -> SettingOption {
    SettingOption::new(value, label)
}

/// Ordered option set plus the value used when a submission is not one of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choices {
    pub options: Vec<SettingOption>,
    pub default: String,
}

impl Choices {
    /// Check whether `value` is one of the declared option keys
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

// =============================================================================
// Field Kinds
// =============================================================================

/// Control kind of a field, with the kind-specific default and payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// Single-line plain text
    Text { default: String },
    /// Multi-line plain text
    Textarea { default: String },
    /// Rich text limited to post-safe markup
    Editor { default: String },
    /// Boolean toggle
    Checkbox { default: bool },
    /// Dropdown restricted to its options
    Select(Choices),
    /// Radio group restricted to its options
    Radio(Choices),
    /// Value stored exactly as submitted; no control is rendered
    Passthrough { default: Value },
}

impl FieldKind {
    /// Lowercase kind name, as used in markup and logs
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Editor { .. } => "editor",
            FieldKind::Checkbox { .. } => "checkbox",
            FieldKind::Select(_) => "select",
            FieldKind::Radio(_) => "radio",
            FieldKind::Passthrough { .. } => "passthrough",
        }
    }

    /// Option set for select and radio fields
    pub fn choices(&self) -> Option<&Choices> {
        match self {
            FieldKind::Select(choices) | FieldKind::Radio(choices) => Some(choices),
            _ => None,
        }
    }

    /// Default value as JSON
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Text { default }
            | FieldKind::Textarea { default }
            | FieldKind::Editor { default } => Value::String(default.clone()),
            FieldKind::Checkbox { default } => Value::Bool(*default),
            FieldKind::Select(choices) | FieldKind::Radio(choices) => {
                Value::String(choices.default.clone())
            }
            FieldKind::Passthrough { default } => default.clone(),
        }
    }
}

// =============================================================================
// Field Descriptor
// =============================================================================

/// Schema entry for one configurable value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub label: String,
    pub key: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldDescriptor {
    fn with_kind(label: impl Into<String>, key: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            kind,
            description: None,
        }
    }

    /// Create a single-line text field
    pub fn text(label: impl Into<String>, key: impl Into<String>, default: impl Into<String>) -> Self {
        Self::with_kind(label, key, FieldKind::Text {
            default: default.into(),
        })
    }

    /// Create a multi-line text field
    pub fn textarea(
        label: impl Into<String>,
        key: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self::with_kind(label, key, FieldKind::Textarea {
            default: default.into(),
        })
    }

    /// Create a rich text field
    pub fn editor(
        label: impl Into<String>,
        key: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self::with_kind(label, key, FieldKind::Editor {
            default: default.into(),
        })
    }

    /// Create a checkbox field
    pub fn checkbox(label: impl Into<String>, key: impl Into<String>, default: bool) -> Self {
        Self::with_kind(label, key, FieldKind::Checkbox { default })
    }

    /// Create a dropdown field
    ///
    /// **Options are required** - the default should be one of them.
    pub fn select(
        label: impl Into<String>,
        key: impl Into<String>,
        default: impl Into<String>,
        options: Vec<SettingOption>,
    ) -> Self {
        Self::with_kind(
            label,
            key,
            FieldKind::Select(Choices {
                options,
                default: default.into(),
            }),
        )
    }

    /// Create a radio group field
    pub fn radio(
        label: impl Into<String>,
        key: impl Into<String>,
        default: impl Into<String>,
        options: Vec<SettingOption>,
    ) -> Self {
        Self::with_kind(
            label,
            key,
            FieldKind::Radio(Choices {
                options,
                default: default.into(),
            }),
        )
    }

    /// Create a field whose submitted value is stored unchanged
    pub fn passthrough(label: impl Into<String>, key: impl Into<String>, default: Value) -> Self {
        Self::with_kind(label, key, FieldKind::Passthrough { default })
    }

    /// Set the help text shown below the control
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Default value as JSON
    pub fn default_value(&self) -> Value {
        self.kind.default_value()
    }
}

// =============================================================================
// Section Descriptor
// =============================================================================

/// What a section tab contains
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "fields", rename_all = "snake_case")]
pub enum SectionKind {
    /// A generic settings form
    Settings(Vec<FieldDescriptor>),
    /// The export/import tab; carries no fields
    ImportExport,
}

/// A named, ordered group of fields shown under one tab
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionDescriptor {
    pub key: String,
    pub title: String,
    #[serde(flatten)]
    pub kind: SectionKind,
}

impl SectionDescriptor {
    /// Create an empty settings section
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            kind: SectionKind::Settings(Vec::new()),
        }
    }

    /// Create the export/import section
    pub fn import_export(title: impl Into<String>) -> Self {
        Self {
            key: IMPORT_EXPORT_SECTION.to_string(),
            title: title.into(),
            kind: SectionKind::ImportExport,
        }
    }

    /// Append a field (ignored on the import/export section)
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        if let SectionKind::Settings(fields) = &mut self.kind {
            fields.push(field);
        }
        self
    }

    /// Fields of this section, empty for the import/export tab
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            SectionKind::Settings(fields) => fields,
            SectionKind::ImportExport => &[],
        }
    }

    /// Find a field by key
    pub fn find(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields().iter().find(|f| f.key == key)
    }

    pub fn is_import_export(&self) -> bool {
        matches!(self.kind, SectionKind::ImportExport)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Immutable, ordered list of sections
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SchemaRegistry {
    sections: Vec<SectionDescriptor>,
}

impl SchemaRegistry {
    /// Build a registry, validating the schema
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSchema` if there are no sections, a section or
    /// field key is duplicated or malformed, or a select/radio default is not
    /// one of its options.
    pub fn new(sections: Vec<SectionDescriptor>) -> Result<Self> {
        let registry = Self { sections };
        registry.validate()?;
        Ok(registry)
    }

    /// The stock schema: general, email and import/export tabs
    pub fn standard() -> Self {
        Self {
            sections: vec![
                SectionDescriptor::new("general", "General Settings")
                    .field(
                        FieldDescriptor::text("API Key", "api_key", "")
                            .description("Enter your API key here"),
                    )
                    .field(
                        FieldDescriptor::textarea("Description", "description", "")
                            .description("Enter a description for your service"),
                    )
                    .field(FieldDescriptor::select(
                        "Service Type",
                        "service_type",
                        "basic",
                        vec![
                            opt("basic", "Basic Service"),
                            opt("premium", "Premium Service"),
                            opt("enterprise", "Enterprise Service"),
                        ],
                    )),
                SectionDescriptor::new("email", "Email Settings")
                    .field(FieldDescriptor::checkbox(
                        "Enable Email Notifications",
                        "enabled",
                        false,
                    ))
                    .field(FieldDescriptor::radio(
                        "Notification Type",
                        "notification_type",
                        "instant",
                        vec![
                            opt("instant", "Instant"),
                            opt("daily", "Daily Digest"),
                            opt("weekly", "Weekly Digest"),
                        ],
                    ))
                    .field(FieldDescriptor::editor(
                        "Email Template",
                        "template",
                        "Hello {user},\n\nThank you for using our service.\n\nBest regards,\n{site_name}",
                    )),
                SectionDescriptor::import_export("Import/Export"),
            ],
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sections.is_empty() {
            return Err(Error::InvalidSchema("at least one section is required".into()));
        }

        let mut section_keys = HashSet::new();
        for section in &self.sections {
            check_key(&section.key)?;
            if !section_keys.insert(section.key.as_str()) {
                return Err(Error::InvalidSchema(format!(
                    "duplicate section key '{}'",
                    section.key
                )));
            }

            let mut field_keys = HashSet::new();
            for field in section.fields() {
                check_key(&field.key)?;
                if !field_keys.insert(field.key.as_str()) {
                    return Err(Error::InvalidSchema(format!(
                        "duplicate field key '{}.{}'",
                        section.key, field.key
                    )));
                }
                if let Some(choices) = field.kind.choices() {
                    if !choices.contains(&choices.default) {
                        return Err(Error::InvalidSchema(format!(
                            "default '{}' of '{}.{}' is not one of its options",
                            choices.default, section.key, field.key
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// All sections in declared order
    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    /// Find a section by key
    pub fn section(&self, key: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// The first (default) section
    pub fn first(&self) -> &SectionDescriptor {
        // `new` rejects empty schemas and `standard` is non-empty
        &self.sections[0]
    }

    /// Find a field by section and field key
    pub fn field(&self, section: &str, key: &str) -> Option<&FieldDescriptor> {
        self.section(section).and_then(|s| s.find(key))
    }

    /// Document holding every declared default
    pub fn defaults(&self) -> Value {
        let mut doc = Map::new();
        for section in self.sections.iter().filter(|s| !s.is_import_export()) {
            let values: Map<String, Value> = section
                .fields()
                .iter()
                .map(|f| (f.key.clone(), f.default_value()))
                .collect();
            doc.insert(section.key.clone(), Value::Object(values));
        }
        Value::Object(doc)
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(['.', '[', ']']) {
        return Err(Error::InvalidSchema(format!(
            "key '{key}' must be non-empty and must not contain '.', '[' or ']'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_schema_is_valid() {
        let registry = SchemaRegistry::standard();
        registry.validate().unwrap();

        let keys: Vec<_> = registry.sections().iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["general", "email", "import_export"]);
        assert!(registry.section("import_export").unwrap().fields().is_empty());
    }

    #[test]
    fn test_standard_defaults() {
        let defaults = SchemaRegistry::standard().defaults();

        assert_eq!(defaults["general"]["service_type"], json!("basic"));
        assert_eq!(defaults["email"]["enabled"], json!(false));
        assert_eq!(defaults["email"]["notification_type"], json!("instant"));
        assert!(defaults.get("import_export").is_none());
    }

    #[test]
    fn test_duplicate_section_rejected() {
        let result = SchemaRegistry::new(vec![
            SectionDescriptor::new("a", "A"),
            SectionDescriptor::new("a", "Again"),
        ]);
        assert!(matches!(result, Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = SchemaRegistry::new(vec![
            SectionDescriptor::new("a", "A")
                .field(FieldDescriptor::text("X", "x", ""))
                .field(FieldDescriptor::checkbox("X again", "x", false)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_outside_options_rejected() {
        let result = SchemaRegistry::new(vec![SectionDescriptor::new("a", "A").field(
            FieldDescriptor::select("Mode", "mode", "turbo", vec![opt("slow", "Slow")]),
        )]);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("turbo"));
    }

    #[test]
    fn test_dotted_key_rejected() {
        let result = SchemaRegistry::new(vec![SectionDescriptor::new("a.b", "A")]);
        assert!(result.is_err());
        assert!(SchemaRegistry::new(Vec::new()).is_err());
    }

    #[test]
    fn test_import_export_section_ignores_fields() {
        let section = SectionDescriptor::import_export("Transfer")
            .field(FieldDescriptor::text("Ignored", "ignored", ""));
        assert!(section.is_import_export());
        assert!(section.fields().is_empty());
    }

    #[test]
    fn test_kind_serializes_with_type_tag() {
        let field = FieldDescriptor::radio("N", "n", "a", vec![opt("a", "A")]);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], json!("radio"));
        assert_eq!(value["options"][0]["value"], json!("a"));
        assert_eq!(value["default"], json!("a"));
    }
}
