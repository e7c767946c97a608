//! HTML escaping for interpolated values
//!
//! Every value, label and title that reaches markup goes through one of these.

/// Escape text for an element body
pub fn esc_html(text: &str) -> String {
    escape(text)
}

/// Escape text for a double- or single-quoted attribute value
pub fn esc_attr(text: &str) -> String {
    escape(text)
}

/// Escape text for a `<textarea>` body
pub fn esc_textarea(text: &str) -> String {
    escape(text)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_all_special_characters() {
        assert_eq!(
            esc_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#039;s&lt;/a&gt;"
        );
    }

    #[test]
    fn test_attr_breakout_is_neutralized() {
        let out = esc_attr(r#"" onmouseover="alert(1)"#);
        assert!(!out.contains('"'));
        assert!(out.starts_with("&quot;"));
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(esc_textarea("Hello {user},\n\nBest"), "Hello {user},\n\nBest");
        assert_eq!(esc_html("Ünïcödé"), "Ünïcödé");
    }
}
