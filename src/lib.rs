//! # tabman - Tabbed Admin Settings Manager
//!
//! A framework-agnostic library for the classic "settings page" of a web admin:
//! a declarative field schema rendered as tabs, one nested settings document
//! stored under a single option key, type-directed sanitization of submitted
//! forms, and whole-document JSON export/import.
//!
//! ## Features
//!
//! - **Schema**: Ordered sections of text, textarea, editor, checkbox, select and radio fields
//! - **Sanitization**: Each kind has its own cleaner; a submitted tab is merged into the stored document
//! - **Rendering**: Escaped HTML for the tab bar, the field table and the export/import cards
//! - **Export/Import**: Dated JSON download and validated JSON upload
//! - **Protection**: Capability check plus per-action anti-forgery tokens on every POST
//! - **Change Events**: Listeners and validators keyed by `section.key`
//!
//! ## Quick Start
//!
//! ```rust
//! use tabman::{Caller, FormData, MemoryStore, Request, SettingsManager, TokenAction};
//!
//! let manager = SettingsManager::builder()
//!     .option_name("my_plugin_options")
//!     .page_slug("my-plugin")
//!     .build_with_store(MemoryStore::new())?;
//!
//! let admin = Caller::admin(1);
//! let token = manager.tokens().issue(TokenAction::Save, admin.user_id);
//!
//! // What the browser posts when the "General" tab is saved
//! let form = FormData::from_urlencoded(&format!(
//!     "my_plugin_options[general][api_key]=abc123&my_plugin_options[general][service_type]=premium&asm_save_nonce={token}"
//! ));
//! let response = manager.handle(&Request::post(admin.clone(), form).with_query("tab", "general"))?;
//! assert_eq!(response.status, 303);
//!
//! // Reading values back, with a default for anything never saved
//! let view = manager.view();
//! assert_eq!(view.get_or("general.service_type", "basic"), "premium");
//! assert_eq!(view.get_or("email.enabled", false), false);
//! # Ok::<(), tabman::Error>(())
//! ```
//!
//! ## Defining a Schema
//!
//! ```rust
//! use tabman::{FieldDescriptor, SchemaRegistry, SectionDescriptor, opt};
//!
//! let registry = SchemaRegistry::new(vec![
//!     SectionDescriptor::new("email", "Email Settings")
//!         .field(FieldDescriptor::checkbox("Enable Email Notifications", "enabled", false))
//!         .field(FieldDescriptor::radio("Notification Type", "notification_type", "instant", vec![
//!             opt("instant", "Instant"),
//!             opt("daily", "Daily Digest"),
//!         ])),
//!     SectionDescriptor::import_export("Import/Export"),
//! ])?;
//! # Ok::<(), tabman::Error>(())
//! ```
//!
//! ## Stored Document
//!
//! Values live in one JSON object, `{section: {field: value}}`. Defaults are
//! applied when reading, never written. Saving a tab only rewrites the sections
//! present in the submission; importing replaces the whole document.

// Core modules
mod error;
mod events;
mod manager;
pub mod security;

// Grouped modules
pub mod auth;
pub mod config;
pub mod http;
pub mod notices;
pub mod render;
pub mod sanitize;
pub mod store;
pub mod transfer;

// Re-exports from core
pub use error::{Error, Result};
pub use events::{EventManager, diff_documents};
pub use manager::{SettingsManager, SettingsManagerBuilder};

// Re-exports from grouped modules
pub use auth::{Caller, TokenAction, TokenIssuer};
pub use config::{
    Choices, FieldDescriptor, FieldKind, IMPORT_EXPORT_SECTION, ImportPolicy, ManagerConfig,
    ManagerConfigBuilder, SchemaRegistry, SectionDescriptor, SectionKind, SettingOption, opt,
};
pub use http::{FormData, Method, Request, Response};
pub use notices::{Notice, NoticeLevel};
pub use store::{MemoryStore, OptionStore, SettingsStore, SettingsView};
#[cfg(feature = "file-store")]
pub use store::FileStore;
pub use transfer::{ExportFile, ImportReport, Upload, UploadStatus};
