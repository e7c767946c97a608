//! Schema and manager configuration
//!
//! - `SchemaRegistry` - Ordered sections and their field descriptors
//! - `FieldKind` - Closed set of control kinds with their payloads
//! - `ManagerConfig` - Option key, page identity, capability and token settings

mod schema;
mod types;

pub use schema::{
    Choices, FieldDescriptor, FieldKind, IMPORT_EXPORT_SECTION, SchemaRegistry,
    SectionDescriptor, SectionKind, SettingOption, opt,
};

pub use types::{ImportPolicy, ManagerConfig, ManagerConfigBuilder};
