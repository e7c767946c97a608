//! Configuration for the settings manager

use std::path::PathBuf;
use time::Duration;

/// How an uploaded import document is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportPolicy {
    /// Store any JSON object exactly as uploaded, extra keys included
    #[default]
    Verbatim,
    /// Run the upload through the field sanitizer; unknown keys are dropped
    Sanitized,
}

/// Configuration for initializing the `SettingsManager`
#[derive(Clone)]
pub struct ManagerConfig {
    /// Option store key holding the settings document; also the form namespace
    pub option_name: String,

    /// Admin page slug used in tab links (`?page=<slug>&tab=<key>`)
    pub page_slug: String,

    /// Page heading
    pub page_title: String,

    /// Capability a caller must hold to view, save, export or import
    pub capability: String,

    /// Secret key for anti-forgery tokens
    pub token_secret: Vec<u8>,

    /// How long an issued token stays valid (at least half of this, at most all of it)
    pub token_lifetime: Duration,

    /// What import does with the uploaded document
    pub import_policy: ImportPolicy,

    /// Directory used by the file-backed option store
    pub config_dir: PathBuf,
}

impl std::fmt::Debug for ManagerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerConfig")
            .field("option_name", &self.option_name)
            .field("page_slug", &self.page_slug)
            .field("page_title", &self.page_title)
            .field("capability", &self.capability)
            .field("token_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("import_policy", &self.import_policy)
            .field("config_dir", &self.config_dir)
            .finish()
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        ManagerConfigBuilder::new().build()
    }
}

impl ManagerConfig {
    /// Create a new builder for ManagerConfig
    ///
    /// # Example
    /// ```rust
    /// use tabman::ManagerConfig;
    ///
    /// let config = ManagerConfig::builder()
    ///     .option_name("my_plugin_options")
    ///     .page_slug("my-plugin")
    ///     .build();
    /// assert_eq!(config.notices_key(), "my_plugin_options_notices");
    /// ```
    pub fn builder() -> ManagerConfigBuilder {
        ManagerConfigBuilder::new()
    }

    /// Option store key for pending admin notices
    pub fn notices_key(&self) -> String {
        format!("{}_notices", self.option_name)
    }

    /// Settings API group name posted back as `option_page`
    pub fn option_group(&self) -> String {
        self.option_name
            .strip_suffix("_options")
            .unwrap_or(&self.option_name)
            .to_string()
    }
}

/// Builder for creating ManagerConfig with a fluent API
#[derive(Debug, Clone)]
pub struct ManagerConfigBuilder {
    option_name: String,
    page_slug: String,
    page_title: String,
    capability: String,
    token_secret: Option<Vec<u8>>,
    token_lifetime: Duration,
    import_policy: ImportPolicy,
    config_dir: Option<PathBuf>,
}

impl Default for ManagerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagerConfigBuilder {
    pub fn new() -> Self {
        Self {
            option_name: "advanced_settings_manager_options".into(),
            page_slug: "advanced-settings-manager".into(),
            page_title: "Advanced Settings Manager".into(),
            capability: "manage_options".into(),
            token_secret: None,
            token_lifetime: Duration::days(1),
            import_policy: ImportPolicy::Verbatim,
            config_dir: None,
        }
    }

    /// Set the option store key (default: "advanced_settings_manager_options")
    pub fn option_name(mut self, name: impl Into<String>) -> Self {
        self.option_name = name.into();
        self
    }

    /// Set the admin page slug
    pub fn page_slug(mut self, slug: impl Into<String>) -> Self {
        self.page_slug = slug.into();
        self
    }

    /// Set the page heading
    pub fn page_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = title.into();
        self
    }

    /// Set the required capability (default: "manage_options")
    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capability = capability.into();
        self
    }

    /// Use a fixed token secret
    ///
    /// Without one, a random secret is generated per process, which invalidates
    /// outstanding forms on restart.
    pub fn token_secret(mut self, secret: impl Into<Vec<u8>>) -> Self {
        self.token_secret = Some(secret.into());
        self
    }

    /// Set the anti-forgery token lifetime (default: one day)
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Choose how imported documents are applied
    pub fn import_policy(mut self, policy: ImportPolicy) -> Self {
        self.import_policy = policy;
        self
    }

    /// Set the directory for the file-backed option store
    ///
    /// Supports `~` expansion for home directory.
    pub fn config_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        #[cfg(feature = "file-store")]
        let path = match dirs::home_dir() {
            Some(home) if path.starts_with("~") => {
                home.join(path.strip_prefix("~").unwrap_or(&path))
            }
            _ => path,
        };
        self.config_dir = Some(path);
        self
    }

    /// Build the ManagerConfig
    ///
    /// If `config_dir` is not set, uses the system config directory.
    pub fn build(self) -> ManagerConfig {
        let config_dir = self.config_dir.unwrap_or_else(|| default_config_dir(&self.page_slug));
        let token_secret = self
            .token_secret
            .unwrap_or_else(|| rand::random::<[u8; 32]>().to_vec());

        ManagerConfig {
            option_name: self.option_name,
            page_slug: self.page_slug,
            page_title: self.page_title,
            capability: self.capability,
            token_secret,
            token_lifetime: self.token_lifetime,
            import_policy: self.import_policy,
            config_dir,
        }
    }
}

#[cfg(feature = "file-store")]
fn default_config_dir(slug: &str) -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(slug))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(not(feature = "file-store"))]
fn default_config_dir(_slug: &str) -> PathBuf {
    PathBuf::from(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ManagerConfig::builder().build();

        assert_eq!(config.option_name, "advanced_settings_manager_options");
        assert_eq!(config.capability, "manage_options");
        assert_eq!(config.option_group(), "advanced_settings_manager");
        assert_eq!(config.token_secret.len(), 32);
        assert_eq!(config.import_policy, ImportPolicy::Verbatim);
    }

    #[test]
    fn test_builder_with_options() {
        let config = ManagerConfig::builder()
            .option_name("shop")
            .page_slug("shop-settings")
            .capability("edit_shop")
            .token_secret(b"fixed".to_vec())
            .import_policy(ImportPolicy::Sanitized)
            .config_dir("/tmp/shop")
            .build();

        assert_eq!(config.notices_key(), "shop_notices");
        assert_eq!(config.option_group(), "shop");
        assert_eq!(config.token_secret, b"fixed");
        assert_eq!(config.config_dir, PathBuf::from("/tmp/shop"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ManagerConfig::builder().token_secret(b"hunter2".to_vec()).build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
