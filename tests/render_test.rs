//! Rendering tests
//!
//! Stored values, labels and notices are untrusted; every one of them must be
//! escaped for the context it lands in.

mod common;

use common::TestFixture;
use serde_json::json;
use tabman::{
    Caller, FieldDescriptor, MemoryStore, SchemaRegistry, SectionDescriptor, SettingsManager, opt,
};

const PAYLOAD: &str = r#""><script>alert('x')</script>"#;

#[test]
fn test_hostile_stored_values_are_escaped() {
    let fixture = TestFixture::with_document(json!({
        "general": {"api_key": PAYLOAD, "description": "</textarea><script>x()</script>"},
        "email": {"template": "<img src=x onerror=alert(1)>"}
    }));

    let general = fixture.page(Some("general"));
    assert!(!general.contains("<script>"));
    assert!(general.contains("&quot;&gt;&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;"));
    assert!(general.contains("&lt;/textarea&gt;"));

    let email = fixture.page(Some("email"));
    assert!(!email.contains("<img"));
    assert!(email.contains("&lt;img src=x onerror=alert(1)&gt;"));
}

#[test]
fn test_hostile_schema_text_is_escaped() {
    let registry = SchemaRegistry::new(vec![
        SectionDescriptor::new("main", "<b>Main</b>")
            .field(
                FieldDescriptor::text("<i>Label</i>", "name", "")
                    .description("Use <em>care</em> & caution"),
            )
            .field(FieldDescriptor::select(
                "Mode",
                "mode",
                "a",
                vec![opt("a", "A & B"), opt("b\"", "<C>")],
            )),
    ])
    .unwrap();
    let manager = SettingsManager::builder()
        .page_title("Tom & Jerry's")
        .schema(registry)
        .build_with_store(MemoryStore::new())
        .unwrap();

    let html = manager.render(&Caller::admin(1), None).unwrap();

    assert!(html.contains("<h1>Tom &amp; Jerry&#039;s</h1>"));
    assert!(html.contains("&lt;b&gt;Main&lt;/b&gt;"));
    assert!(html.contains("&lt;i&gt;Label&lt;/i&gt;"));
    assert!(html.contains(r#"<p class="description">Use &lt;em&gt;care&lt;/em&gt; &amp; caution</p>"#));
    assert!(html.contains(r#"<option value="a" selected='selected'>A &amp; B</option>"#));
    assert!(html.contains(r#"<option value="b&quot;">&lt;C&gt;</option>"#));
}

#[test]
fn test_settings_form_carries_save_token() {
    let fixture = TestFixture::new();

    let html = fixture.page(Some("email"));

    assert!(html.contains(r#"<form action="?page=asm&amp;tab=email" method="post">"#));
    assert!(html.contains(r#"<input type="hidden" name="option_page" value="asm">"#));
    assert!(html.contains(r#"<input type="hidden" name="action" value="update">"#));
    assert!(html.contains(r#"name="asm_save_nonce""#));
    assert!(html.contains(r#"name="asm_options[email][enabled]" value="1">"#));
    assert!(html.contains(
        r#"<label><input type="radio" name="asm_options[email][notification_type]" value="instant" checked='checked'> Instant</label><br>"#
    ));
    assert!(html.contains("Save Changes"));
}

#[test]
fn test_import_export_tab_has_both_cards() {
    let fixture = TestFixture::new();

    let html = fixture.page(Some("import_export"));

    assert!(html.contains(r#"class="nav-tab nav-tab-active">Import/Export</a>"#));
    assert!(html.contains(r#"name="asm_export_settings""#));
    assert!(html.contains(r#"name="asm_export_nonce""#));
    assert!(html.contains(r#"enctype="multipart/form-data""#));
    assert!(html.contains(r#"<input type="file" name="settings_import" accept=".json">"#));
    assert!(html.contains(r#"name="asm_import_nonce""#));
    assert!(!html.contains("form-table"));
}

#[test]
fn test_page_tokens_verify_for_their_action_only() {
    let fixture = TestFixture::new();
    let tokens = fixture.manager.page_tokens(&fixture.admin);
    let issuer = fixture.manager.tokens();

    assert!(issuer.verify(tabman::TokenAction::Save, 1, &tokens.save));
    assert!(issuer.verify(tabman::TokenAction::Export, 1, &tokens.export));
    assert!(issuer.verify(tabman::TokenAction::Import, 1, &tokens.import));
    assert!(!issuer.verify(tabman::TokenAction::Import, 1, &tokens.save));
}
