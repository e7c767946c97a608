//! Common test utilities for tabman integration tests
//!
//! Provides a manager over an in-memory option store plus helpers that drive
//! it the way a browser would: urlencoded form posts and file uploads.

#![allow(dead_code)]

use serde_json::Value;
use std::sync::Arc;
use tabman::{
    Caller, FormData, MemoryStore, OptionStore, Request, Response, SettingsManager, TokenAction,
    Upload,
};

pub const OPTION_NAME: &str = "asm_options";
pub const PAGE_SLUG: &str = "asm";

// =============================================================================
// Test Fixtures
// =============================================================================

/// Manager over a shared in-memory store, with an admin caller
pub struct TestFixture {
    pub backend: Arc<MemoryStore>,
    pub manager: SettingsManager<Arc<MemoryStore>>,
    pub admin: Caller,
}

impl TestFixture {
    /// Create a fixture with the stock schema and an empty store
    pub fn new() -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let backend = Arc::new(MemoryStore::new());
        let manager = SettingsManager::builder()
            .option_name(OPTION_NAME)
            .page_slug(PAGE_SLUG)
            .token_secret(b"integration-secret".to_vec())
            .build_with_store(backend.clone())
            .expect("Failed to create manager");

        Self {
            backend,
            manager,
            admin: Caller::admin(1),
        }
    }

    /// Create a fixture whose store already holds `document`
    pub fn with_document(document: Value) -> Self {
        let fixture = Self::new();
        fixture
            .backend
            .update_option(OPTION_NAME, &document)
            .expect("Failed to seed document");
        fixture
    }

    /// Raw stored document, `None` if never written
    pub fn stored(&self) -> Option<Value> {
        self.backend
            .get_option(OPTION_NAME)
            .expect("Failed to read document")
    }

    /// Token for `action` issued to the fixture admin
    pub fn token(&self, action: TokenAction) -> String {
        self.manager.tokens().issue(action, self.admin.user_id)
    }

    /// POST an urlencoded body from the admin, with the save token appended
    pub fn post_save(&self, tab: &str, body: &str) -> tabman::Result<Response> {
        let body = format!("{body}&asm_save_nonce={}", self.token(TokenAction::Save));
        let request = Request::post(self.admin.clone(), FormData::from_urlencoded(&body))
            .with_query("page", PAGE_SLUG)
            .with_query("tab", tab);
        self.manager.handle(&request)
    }

    /// POST the import form from the admin with `upload` attached
    pub fn post_import(&self, upload: Upload) -> tabman::Result<Response> {
        let form = FormData::new().with("asm_import_nonce", self.token(TokenAction::Import));
        let request = Request::post(self.admin.clone(), form)
            .with_query("tab", "import_export")
            .with_upload(upload);
        self.manager.handle(&request)
    }

    /// POST the export form from the admin
    pub fn post_export(&self) -> tabman::Result<Response> {
        let form = FormData::new()
            .with("asm_export_settings", "1")
            .with("asm_export_nonce", self.token(TokenAction::Export));
        let request = Request::post(self.admin.clone(), form).with_query("tab", "import_export");
        self.manager.handle(&request)
    }

    /// GET a tab as the admin and return the HTML
    pub fn page(&self, tab: Option<&str>) -> String {
        let mut request = Request::get(self.admin.clone()).with_query("page", PAGE_SLUG);
        if let Some(tab) = tab {
            request = request.with_query("tab", tab);
        }
        let response = self.manager.handle(&request).expect("GET never fails");
        assert_eq!(response.status, 200);
        response.text()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Document used by round-trip tests: every field kind plus an extra section
pub fn sample_document() -> Value {
    serde_json::json!({
        "general": {
            "api_key": "sk-12345",
            "description": "Line one\nLine two",
            "service_type": "enterprise"
        },
        "email": {
            "enabled": true,
            "notification_type": "weekly",
            "template": "<p>Hello {user}, ünïcödé ✓</p>"
        },
        "custom": {"nested": [1, 2, {"deep": null}]}
    })
}
