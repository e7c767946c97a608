//! HTML for the tabbed settings page
//!
//! The page is a heading, pending notices, one navigation tab per section and
//! the body of the active tab: either the settings form for that section or
//! the export/import cards.

pub mod escape;
mod field;

pub use escape::{esc_attr, esc_html, esc_textarea};
pub use field::{field_id, field_name, render_field};

use crate::auth::TokenAction;
use crate::config::{ManagerConfig, SchemaRegistry, SectionDescriptor};
use crate::http::{EXPORT_FLAG, UPLOAD_FIELD};
use crate::notices::Notice;
use crate::store::{OptionStore, SettingsView};
use url::form_urlencoded;

/// Tokens embedded in the page forms, one per action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageTokens {
    pub save: String,
    pub export: String,
    pub import: String,
}

/// Renders the settings page for one schema and configuration
pub struct Renderer<'a> {
    registry: &'a SchemaRegistry,
    config: &'a ManagerConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(registry: &'a SchemaRegistry, config: &'a ManagerConfig) -> Self {
        Self { registry, config }
    }

    /// Section shown for a `tab` value; unknown or missing tabs show the first section
    pub fn active_section(&self, tab: Option<&str>) -> &'a SectionDescriptor {
        tab.and_then(|key| self.registry.section(key))
            .unwrap_or_else(|| self.registry.first())
    }

    /// Link to a tab of this page, with both query values form-encoded
    pub fn tab_url(&self, section_key: &str) -> String {
        format!(
            "?page={}&tab={}",
            encode(&self.config.page_slug),
            encode(section_key)
        )
    }

    /// Render the full page
    pub fn page<B: OptionStore>(
        &self,
        view: &SettingsView<'_, B>,
        tab: Option<&str>,
        notices: &[Notice],
        tokens: &PageTokens,
    ) -> String {
        let active = self.active_section(tab);
        let mut out = String::with_capacity(4096);

        out.push_str(r#"<div class="wrap">"#);
        out.push_str(&format!("<h1>{}</h1>", esc_html(&self.config.page_title)));
        self.notices(&mut out, notices);
        self.tabs(&mut out, active);

        if active.is_import_export() {
            self.import_export(&mut out, active, tokens);
        } else {
            self.settings_form(&mut out, view, active, &tokens.save);
        }

        out.push_str("</div>");
        out
    }

    fn notices(&self, out: &mut String, notices: &[Notice]) {
        for notice in notices {
            out.push_str(&format!(
                r#"<div id="setting-error-{}" class="notice {} settings-error is-dismissible"><p><strong>{}</strong></p></div>"#,
                esc_attr(&notice.code),
                notice.level.css_class(),
                esc_html(&notice.message)
            ));
        }
    }

    fn tabs(&self, out: &mut String, active: &SectionDescriptor) {
        out.push_str(r#"<h2 class="nav-tab-wrapper">"#);
        for section in self.registry.sections() {
            let class = if section.key == active.key {
                "nav-tab nav-tab-active"
            } else {
                "nav-tab"
            };
            out.push_str(&format!(
                r#"<a href="{}" class="{class}">{}</a>"#,
                esc_attr(&self.tab_url(&section.key)),
                esc_html(&section.title)
            ));
        }
        out.push_str("</h2>");
    }

    fn settings_form<B: OptionStore>(
        &self,
        out: &mut String,
        view: &SettingsView<'_, B>,
        section: &SectionDescriptor,
        token: &str,
    ) {
        out.push_str(&format!(
            r#"<form action="{}" method="post">"#,
            esc_attr(&self.tab_url(&section.key))
        ));
        hidden(out, "option_page", &self.config.option_group());
        hidden(out, "action", "update");
        hidden(out, TokenAction::Save.field_name(), token);

        out.push_str(&format!("<h2>{}</h2>", esc_html(&section.title)));
        out.push_str(r#"<table class="form-table" role="presentation">"#);
        for field in section.fields() {
            let path = format!("{}.{}", section.key, field.key);
            let current = view.get_or(&path, field.default_value());
            out.push_str(&format!(
                r#"<tr><th scope="row"><label for="{}">{}</label></th><td>"#,
                esc_attr(&field_id(&section.key, &field.key)),
                esc_html(&field.label)
            ));
            render_field(out, &self.config.option_name, &section.key, field, &current);
            out.push_str("</td></tr>");
        }
        out.push_str("</table>");

        out.push_str(
            r#"<p class="submit"><input type="submit" name="submit" id="submit" class="button button-primary" value="Save Changes"></p>"#,
        );
        out.push_str("</form>");
    }

    fn import_export(&self, out: &mut String, section: &SectionDescriptor, tokens: &PageTokens) {
        let action = esc_attr(&self.tab_url(&section.key));

        out.push_str(r#"<div class="card"><h3>Export Settings</h3>"#);
        out.push_str(&format!(r#"<form action="{action}" method="post">"#));
        hidden(out, TokenAction::Export.field_name(), &tokens.export);
        out.push_str(&format!(
            r#"<p><button type="submit" name="{EXPORT_FLAG}" value="1" class="button button-primary">Export Settings</button></p>"#
        ));
        out.push_str("</form></div>");

        out.push_str(r#"<div class="card"><h3>Import Settings</h3>"#);
        out.push_str(&format!(
            r#"<form action="{action}" method="post" enctype="multipart/form-data">"#
        ));
        hidden(out, TokenAction::Import.field_name(), &tokens.import);
        out.push_str(&format!(
            r#"<p><input type="file" name="{UPLOAD_FIELD}" accept=".json"></p>"#
        ));
        out.push_str(
            r#"<p><button type="submit" class="button button-primary">Import Settings</button></p>"#,
        );
        out.push_str("</form></div>");
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn hidden(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!(
        r#"<input type="hidden" name="{}" value="{}">"#,
        esc_attr(name),
        esc_attr(value)
    ));
}
