//! Main settings manager module
//!
//! This module contains the [`SettingsManager`] struct, which ties the schema,
//! the option store, the sanitizer, the renderer and the export/import handler
//! together behind one request entry point.

mod builder;
mod handler;

pub use builder::SettingsManagerBuilder;

use crate::auth::{Caller, TokenAction, TokenIssuer};
use crate::config::{ManagerConfig, SchemaRegistry};
use crate::error::{Error, Result};
use crate::events::EventManager;
use crate::notices::NoticeQueue;
use crate::render::{PageTokens, Renderer};
use crate::sanitize::{Sanitized, Sanitizer};
use crate::store::{MemoryStore, OptionStore, SettingsStore, SettingsView};
use crate::transfer::{ExportFile, ImportReport, Transfer, Upload};
use log::{debug, info};
use serde_json::Value;

/// Tabbed admin settings page over one settings document.
///
/// The manager owns everything a request needs and is constructed once by the
/// host, then shared. Nothing is global: two managers with different option
/// names never see each other's state.
///
/// - **Render**: the tabbed page with current values and pending notices
/// - **Save**: sanitize a submitted tab and merge it into the stored document
/// - **Export/Import**: download or replace the whole document as JSON
/// - **Change Events**: listeners and validators keyed by `section.key`
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use tabman::{Caller, MemoryStore, SettingsManager, TokenAction};
///
/// let manager = SettingsManager::builder()
///     .option_name("shop_options")
///     .build_with_store(MemoryStore::new())?;
///
/// let admin = Caller::admin(1);
/// let token = manager.tokens().issue(TokenAction::Save, admin.user_id);
/// manager.save(&admin, &token, &json!({"email": {"enabled": "1"}}))?;
///
/// assert_eq!(manager.view().get_or("email.enabled", false), json!(true));
/// # Ok::<(), tabman::Error>(())
/// ```
pub struct SettingsManager<B: OptionStore = MemoryStore> {
    config: ManagerConfig,
    registry: SchemaRegistry,
    store: SettingsStore<B>,
    tokens: TokenIssuer,
    events: EventManager,
}

impl SettingsManager {
    /// Create a builder for `SettingsManager` with a fluent API.
    ///
    /// This is the recommended way to create a `SettingsManager`.
    pub fn builder() -> SettingsManagerBuilder {
        SettingsManagerBuilder::new()
    }
}

impl<B: OptionStore> SettingsManager<B> {
    /// Create a manager over `backend`
    pub fn new(config: ManagerConfig, registry: SchemaRegistry, backend: B) -> Self {
        let store = SettingsStore::new(backend, config.option_name.clone());
        let tokens = TokenIssuer::new(config.token_secret.clone(), config.token_lifetime);
        info!(
            "Settings manager ready: option '{}', {} sections, {} store",
            config.option_name,
            registry.sections().len(),
            store.backend().backend_name()
        );
        Self {
            config,
            registry,
            store,
            tokens,
            events: EventManager::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &SettingsStore<B> {
        &self.store
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Listener and validator registry
    pub fn events(&self) -> &EventManager {
        &self.events
    }

    /// Start a request-scoped, read-memoized view of the document
    pub fn view(&self) -> SettingsView<'_, B> {
        self.store.view()
    }

    /// Notice queue of this page
    pub fn notices(&self) -> NoticeQueue<'_, B> {
        NoticeQueue::new(self.store.backend(), self.config.notices_key())
    }

    /// Fresh tokens for every form on the page
    pub fn page_tokens(&self, caller: &Caller) -> PageTokens {
        PageTokens {
            save: self.tokens.issue(TokenAction::Save, caller.user_id),
            export: self.tokens.issue(TokenAction::Export, caller.user_id),
            import: self.tokens.issue(TokenAction::Import, caller.user_id),
        }
    }

    fn sanitizer(&self) -> Sanitizer<'_> {
        Sanitizer::new(&self.registry, &self.events)
    }

    fn transfer(&self) -> Transfer<'_, B> {
        Transfer::new(
            &self.store,
            &self.tokens,
            &self.config.capability,
            self.config.import_policy,
            self.sanitizer(),
        )
    }

    fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.registry, &self.config)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Render the page for `tab`, draining pending notices
    ///
    /// Returns `None` when the caller lacks the capability; nothing is rendered
    /// and the notice queue is left alone.
    pub fn render(&self, caller: &Caller, tab: Option<&str>) -> Option<String> {
        if !caller.can(&self.config.capability) {
            debug!("User {} may not view the settings page", caller.user_id);
            return None;
        }
        let notices = self.notices().drain();
        let view = self.view();
        Some(
            self.renderer()
                .page(&view, tab, &notices, &self.page_tokens(caller)),
        )
    }

    /// Sanitize a submitted form and merge it into the stored document
    ///
    /// `raw` is the value posted under the option name. Change listeners run
    /// after the document is persisted.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` or `InvalidToken` for an unauthorized caller,
    /// or a store error. The store is unchanged on error.
    pub fn save(&self, caller: &Caller, token: &str, raw: &Value) -> Result<Sanitized> {
        if !caller.can(&self.config.capability) {
            return Err(Error::PermissionDenied {
                action: TokenAction::Save.to_string(),
            });
        }
        if !self.tokens.verify(TokenAction::Save, caller.user_id, token) {
            return Err(Error::InvalidToken {
                action: TokenAction::Save.to_string(),
            });
        }

        let current = self.store.load()?;
        let sanitized = self.sanitizer().sanitize(raw, &current);
        self.store.save(&sanitized.document)?;

        let changed = self.events.notify_changes(&current, &sanitized.document);
        info!(
            "User {} saved settings '{}' ({changed} fields changed)",
            caller.user_id, self.config.option_name
        );
        Ok(sanitized)
    }

    /// Build the export download
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` or `InvalidToken` for an unauthorized caller,
    /// or a store/formatting error.
    pub fn export(&self, caller: &Caller, token: &str) -> Result<ExportFile> {
        self.transfer().export(caller, token)
    }

    /// Replace the stored document with an uploaded JSON object
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` or `InvalidToken` for an unauthorized caller,
    /// an upload validation error, or a store error. The store is unchanged on
    /// error.
    pub fn import(&self, caller: &Caller, token: &str, upload: &Upload) -> Result<ImportReport> {
        let report = self.transfer().import(caller, token, upload)?;
        self.events.notify_changes(&report.previous, &report.imported);
        Ok(report)
    }
}
