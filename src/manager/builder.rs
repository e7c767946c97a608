//! Builder for SettingsManager
//!
//! This module contains [`SettingsManagerBuilder`] which provides a fluent API
//! for creating a [`SettingsManager`](super::SettingsManager).

use crate::config::{ImportPolicy, ManagerConfig, ManagerConfigBuilder, SchemaRegistry};
use crate::error::{Error, Result};
use crate::store::OptionStore;
use std::path::PathBuf;
use time::Duration;

use super::SettingsManager;

/// Builder for creating a [`SettingsManager`] with a fluent API.
///
/// Without [`schema`](Self::schema) the stock general/email/import-export
/// schema is used.
///
/// # Example
///
/// ```rust,no_run
/// use tabman::{ImportPolicy, SettingsManager};
///
/// let manager = SettingsManager::builder()
///     .option_name("shop_options")
///     .page_slug("shop-settings")
///     .config_dir("~/.config/shop")
///     .import_policy(ImportPolicy::Sanitized)
///     .build()
///     .unwrap();
/// ```
pub struct SettingsManagerBuilder {
    config_builder: ManagerConfigBuilder,
    registry: Option<SchemaRegistry>,
}

impl Default for SettingsManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsManagerBuilder {
    pub fn new() -> Self {
        Self {
            config_builder: ManagerConfig::builder(),
            registry: None,
        }
    }

    /// Set the section schema
    pub fn schema(mut self, registry: SchemaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the option store key of the settings document
    pub fn option_name(mut self, name: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.option_name(name);
        self
    }

    /// Set the admin page slug used in tab links
    pub fn page_slug(mut self, slug: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.page_slug(slug);
        self
    }

    /// Set the page heading
    pub fn page_title(mut self, title: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.page_title(title);
        self
    }

    /// Set the capability required for every operation
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.capability(capability);
        self
    }

    /// Use a fixed token secret so issued forms survive restarts
    pub fn token_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.config_builder = self.config_builder.token_secret(secret);
        self
    }

    /// Set the anti-forgery token lifetime
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.config_builder = self.config_builder.token_lifetime(lifetime);
        self
    }

    /// Choose how imported documents are applied
    pub fn import_policy(mut self, policy: ImportPolicy) -> Self {
        self.config_builder = self.config_builder.import_policy(policy);
        self
    }

    /// Set the directory used by [`build`](Self::build)
    ///
    /// Supports `~` expansion for home directory.
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_builder = self.config_builder.config_dir(path);
        self
    }

    /// Build a manager over a host-provided option store
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the option name or capability is unusable.
    pub fn build_with_store<B: OptionStore>(self, store: B) -> Result<SettingsManager<B>> {
        let config = self.config_builder.build();
        check_config(&config)?;
        let registry = self.registry.unwrap_or_else(SchemaRegistry::standard);
        Ok(SettingsManager::new(config, registry, store))
    }

    /// Build a manager persisting options as JSON files under `config_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be created.
    #[cfg(feature = "file-store")]
    pub fn build(self) -> Result<SettingsManager<crate::store::FileStore>> {
        let config = self.config_builder.build();
        check_config(&config)?;
        let store = crate::store::FileStore::open(&config.config_dir)?;
        let registry = self.registry.unwrap_or_else(SchemaRegistry::standard);
        Ok(SettingsManager::new(config, registry, store))
    }
}

fn check_config(config: &ManagerConfig) -> Result<()> {
    if config.option_name.is_empty() || config.option_name.contains(['[', ']', '.']) {
        return Err(Error::Config(format!(
            "option name '{}' must be non-empty and must not contain '[', ']' or '.'",
            config.option_name
        )));
    }
    if config.capability.is_empty() {
        return Err(Error::Config("capability must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SectionDescriptor;
    use crate::store::MemoryStore;

    #[test]
    fn test_build_with_store_uses_standard_schema() {
        let manager = SettingsManagerBuilder::new()
            .option_name("x_options")
            .build_with_store(MemoryStore::new())
            .unwrap();

        assert_eq!(manager.config().option_name, "x_options");
        assert_eq!(manager.store().option_name(), "x_options");
        assert_eq!(manager.registry().first().key, "general");
    }

    #[test]
    fn test_custom_schema() {
        let registry =
            SchemaRegistry::new(vec![SectionDescriptor::new("only", "Only")]).unwrap();
        let manager = SettingsManagerBuilder::new()
            .schema(registry)
            .build_with_store(MemoryStore::new())
            .unwrap();

        assert_eq!(manager.registry().sections().len(), 1);
    }

    #[test]
    fn test_bracketed_option_name_rejected() {
        let result = SettingsManagerBuilder::new()
            .option_name("a[b]")
            .build_with_store(MemoryStore::new());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[cfg(feature = "file-store")]
    #[test]
    fn test_build_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/settings");

        let manager = SettingsManagerBuilder::new()
            .config_dir(&target)
            .build()
            .unwrap();

        assert!(target.is_dir());
        assert_eq!(manager.store().backend().dir(), target.as_path());
    }
}
