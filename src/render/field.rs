//! Markup for a single field control

use super::escape::{esc_attr, esc_html, esc_textarea};
use crate::config::{Choices, FieldDescriptor, FieldKind};
use crate::sanitize::{scalar_string, to_bool};
use serde_json::Value;

/// Form control name: `<option_name>[<section>][<key>]`
pub fn field_name(option_name: &str, section: &str, key: &str) -> String {
    format!("{option_name}[{section}][{key}]")
}

/// Element id: `asm_<section>_<key>`
pub fn field_id(section: &str, key: &str) -> String {
    format!("asm_{section}_{key}")
}

/// Render the control for `field` showing `current`, followed by its description
pub fn render_field(
    out: &mut String,
    option_name: &str,
    section: &str,
    field: &FieldDescriptor,
    current: &Value,
) {
    let name = esc_attr(&field_name(option_name, section, &field.key));
    let id = esc_attr(&field_id(section, &field.key));

    match &field.kind {
        FieldKind::Text { .. } => out.push_str(&format!(
            r#"<input type="text" id="{id}" name="{name}" value="{}" class="regular-text">"#,
            esc_attr(&scalar_string(current))
        )),
        FieldKind::Textarea { .. } => out.push_str(&format!(
            r#"<textarea id="{id}" name="{name}" rows="5" class="large-text">{}</textarea>"#,
            esc_textarea(&scalar_string(current))
        )),
        FieldKind::Editor { .. } => out.push_str(&format!(
            r#"<textarea id="{id}" name="{name}" rows="10" class="wp-editor-area">{}</textarea>"#,
            esc_textarea(&scalar_string(current))
        )),
        FieldKind::Checkbox { .. } => out.push_str(&format!(
            r#"<input type="checkbox" id="{id}" name="{name}" value="1"{}>"#,
            if to_bool(current) { " checked='checked'" } else { "" }
        )),
        FieldKind::Radio(choices) => render_radio(out, &name, choices, current),
        FieldKind::Select(choices) => render_select(out, &id, &name, choices, current),
        FieldKind::Passthrough { .. } => {}
    }

    if let Some(description) = field.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!(r#"<p class="description">{}</p>"#, esc_html(description)));
    }
}

fn render_radio(out: &mut String, name: &str, choices: &Choices, current: &Value) {
    let current = scalar_string(current);
    for option in &choices.options {
        let checked = if option.value == current { " checked='checked'" } else { "" };
        out.push_str(&format!(
            r#"<label><input type="radio" name="{name}" value="{}"{checked}> {}</label><br>"#,
            esc_attr(&option.value),
            esc_html(&option.label)
        ));
    }
}

fn render_select(out: &mut String, id: &str, name: &str, choices: &Choices, current: &Value) {
    let current = scalar_string(current);
    out.push_str(&format!(r#"<select id="{id}" name="{name}">"#));
    for option in &choices.options {
        let selected = if option.value == current { " selected='selected'" } else { "" };
        out.push_str(&format!(
            r#"<option value="{}"{selected}>{}</option>"#,
            esc_attr(&option.value),
            esc_html(&option.label)
        ));
    }
    out.push_str("</select>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::opt;
    use serde_json::json;

    fn render(field: &FieldDescriptor, current: Value) -> String {
        let mut out = String::new();
        render_field(&mut out, "opts", "general", field, &current);
        out
    }

    #[test]
    fn test_text_input_markup() {
        let field = FieldDescriptor::text("API Key", "api_key", "");
        assert_eq!(
            render(&field, json!("abc")),
            r#"<input type="text" id="asm_general_api_key" name="opts[general][api_key]" value="abc" class="regular-text">"#
        );
    }

    #[test]
    fn test_text_value_is_escaped() {
        let field = FieldDescriptor::text("API Key", "api_key", "");
        let out = render(&field, json!(r#""><script>alert(1)</script>"#));
        assert!(!out.contains("<script>"));
        assert!(out.contains("value=\"&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn test_editor_and_textarea_rows() {
        let editor = FieldDescriptor::editor("Template", "template", "");
        let out = render(&editor, json!("<p>Hi</p>"));
        assert!(out.contains(r#"rows="10" class="wp-editor-area">&lt;p&gt;Hi&lt;/p&gt;</textarea>"#));

        let textarea = FieldDescriptor::textarea("Description", "description", "");
        assert!(render(&textarea, json!("x")).contains(r#"rows="5" class="large-text">x<"#));
    }

    #[test]
    fn test_checkbox_checked_when_truthy() {
        let field = FieldDescriptor::checkbox("Enabled", "enabled", false);
        assert!(render(&field, json!(true)).contains("checked='checked'"));
        assert!(render(&field, json!("1")).contains("checked='checked'"));
        assert!(!render(&field, json!(false)).contains("checked"));
    }

    #[test]
    fn test_select_marks_current_in_declared_order() {
        let field = FieldDescriptor::select(
            "Service",
            "service_type",
            "basic",
            vec![opt("basic", "Basic"), opt("premium", "Premium <Pro>")],
        );
        let out = render(&field, json!("premium"));

        assert_eq!(
            out,
            concat!(
                r#"<select id="asm_general_service_type" name="opts[general][service_type]">"#,
                r#"<option value="basic">Basic</option>"#,
                r#"<option value="premium" selected='selected'>Premium &lt;Pro&gt;</option>"#,
                "</select>"
            )
        );
    }

    #[test]
    fn test_radio_list() {
        let field = FieldDescriptor::radio(
            "Type",
            "notification_type",
            "instant",
            vec![opt("instant", "Instant"), opt("daily", "Daily Digest")],
        );
        let out = render(&field, json!("daily"));

        assert!(out.contains(r#"value="instant"> Instant</label><br>"#));
        assert!(out.contains(r#"value="daily" checked='checked'> Daily Digest</label><br>"#));
    }

    #[test]
    fn test_description_and_passthrough() {
        let field = FieldDescriptor::passthrough("Raw", "raw", json!(null)).description("Set by <API>");
        assert_eq!(
            render(&field, json!({"a": 1})),
            r#"<p class="description">Set by &lt;API&gt;</p>"#
        );
    }
}
