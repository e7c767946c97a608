//! String cleaners for the text, textarea and editor field kinds

use regex::{Captures, Regex};
use std::sync::LazyLock;

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:script|style)\b[^>]*>.*?</(?:script|style)\s*>")
        .expect("script/style pattern is valid")
});

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

// Tag bodies skip over quoted attribute values, which may contain `<` or `>`.
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"</?[a-zA-Z!?](?:"[^"]*"|'[^']*'|[^'"<>])*>"#).expect("tag pattern is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("whitespace pattern is valid"));

static OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("octet pattern is valid"));

static SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("space pattern is valid"));

static ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:"[^"]*"|'[^']*'|[^'"<>])*)>"#)
        .expect("element pattern is valid")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("attribute pattern is valid")
});

/// Upper bound on strip passes; nested fragments such as `<<b>script>` need more than one
const MAX_PASSES: usize = 8;

/// Attributes accepted on every allowed element
const GLOBAL_ATTRIBUTES: &[&str] = &["class", "id", "title", "dir", "lang"];

/// Elements kept by [`kses_post`] and their extra attributes
const ALLOWED_ELEMENTS: &[(&str, &[&str])] = &[
    ("a", &["href", "target", "rel", "name"]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("code", &[]),
    ("div", &["align"]),
    ("em", &[]),
    ("h1", &["align"]),
    ("h2", &["align"]),
    ("h3", &["align"]),
    ("h4", &["align"]),
    ("h5", &["align"]),
    ("h6", &["align"]),
    ("hr", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "width", "height", "loading"]),
    ("li", &["value"]),
    ("ol", &["start", "reversed", "type"]),
    ("p", &["align"]),
    ("pre", &[]),
    ("span", &[]),
    ("strong", &[]),
    ("table", &["border", "cellpadding", "cellspacing", "width"]),
    ("tbody", &[]),
    ("td", &["colspan", "rowspan", "align", "valign"]),
    ("th", &["colspan", "rowspan", "align", "valign", "scope"]),
    ("thead", &[]),
    ("tr", &["align", "valign"]),
    ("u", &[]),
    ("ul", &["type"]),
];

const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite"];

const ALLOWED_PROTOCOLS: &[&str] = &["http", "https", "mailto", "ftp", "tel"];

/// Clean a single-line text value: no markup, no line breaks, no percent octets
///
/// ```rust
/// use tabman::sanitize::text_field;
/// assert_eq!(text_field("  <b>Acme</b>\n  Corp  "), "Acme Corp");
/// ```
pub fn text_field(input: &str) -> String {
    clean_text(input, false)
}

/// Clean a multi-line text value: like [`text_field`] but line breaks survive
pub fn textarea_field(input: &str) -> String {
    clean_text(input, true)
}

fn clean_text(input: &str, keep_newlines: bool) -> String {
    // A `<` that survives stripping opened no complete tag; keep it as text.
    let mut filtered = strip_all_tags(input).replace('<', "&lt;");

    if !keep_newlines {
        filtered = WHITESPACE_RUN.replace_all(&filtered, " ").into_owned();
    }
    filtered = filtered.trim().to_string();

    let mut found = false;
    while OCTET.is_match(&filtered) {
        filtered = OCTET.replace_all(&filtered, "").into_owned();
        found = true;
    }
    if found {
        filtered = SPACE_RUN.replace_all(&filtered, " ").trim().to_string();
    }

    filtered
}

/// Remove every tag, dropping `<script>` and `<style>` bodies entirely
pub fn strip_all_tags(input: &str) -> String {
    let mut current = SCRIPT_STYLE.replace_all(input, "").into_owned();
    for _ in 0..MAX_PASSES {
        let next = ANY_TAG.replace_all(&current, "");
        if next == current {
            break;
        }
        current = SCRIPT_STYLE.replace_all(&next, "").into_owned();
    }
    current
}

/// Keep only post-safe markup
///
/// Allowed elements keep their allowed attributes; event handler attributes
/// and URLs with a non-web protocol are removed. Everything else that looks
/// like a tag is dropped, along with `<script>`/`<style>` bodies and comments.
///
/// ```rust
/// use tabman::sanitize::kses_post;
/// let clean = kses_post(r#"<p onclick="x()">Hi <a href="javascript:alert(1)">there</a></p>"#);
/// assert_eq!(clean, "<p>Hi <a>there</a></p>");
/// ```
pub fn kses_post(input: &str) -> String {
    let mut current = input.to_string();
    for _ in 0..MAX_PASSES {
        let stripped = SCRIPT_STYLE.replace_all(&current, "");
        let stripped = COMMENT.replace_all(&stripped, "");
        let next = ELEMENT
            .replace_all(&stripped, |caps: &Captures| filter_element(caps))
            .into_owned();
        if next == current {
            return escape_outside_tags(&next);
        }
        current = next;
    }
    // Still changing: neutralize whatever angle brackets are left.
    escape_brackets(&current)
}

/// Entity-escape brackets in the text between the tags [`filter_element`] emitted
///
/// Once filtering is stable every [`ELEMENT`] match is an allowed tag, so
/// anything else holding `<` or `>` is a fragment and must render as text.
fn escape_outside_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for tag in ELEMENT.find_iter(html) {
        out.push_str(&escape_brackets(&html[last..tag.start()]));
        out.push_str(tag.as_str());
        last = tag.end();
    }
    out.push_str(&escape_brackets(&html[last..]));
    out
}

fn escape_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

fn filter_element(caps: &Captures) -> String {
    let closing = !caps[1].is_empty();
    let name = caps[2].to_ascii_lowercase();
    let Some((_, extra)) = ALLOWED_ELEMENTS.iter().find(|(tag, _)| *tag == name) else {
        return String::new();
    };

    if closing {
        return format!("</{name}>");
    }

    let raw_attrs = &caps[3];
    let self_closing = raw_attrs.trim_end().ends_with('/');
    let mut out = format!("<{name}");

    for attr in ATTRIBUTE.captures_iter(raw_attrs) {
        let attr_name = attr[1].to_ascii_lowercase();
        if attr_name.starts_with("on")
            || !(GLOBAL_ATTRIBUTES.contains(&attr_name.as_str()) || extra.contains(&attr_name.as_str()))
        {
            continue;
        }

        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .or_else(|| attr.get(4))
            .map_or("", |m| m.as_str());

        if URL_ATTRIBUTES.contains(&attr_name.as_str()) && !is_safe_url(value) {
            continue;
        }

        out.push_str(&format!(" {attr_name}=\"{}\"", quote_attr(value)));
    }

    if self_closing {
        out.push_str(" /");
    }
    out.push('>');
    out
}

/// Check a URL attribute against the protocol allow-list
///
/// Relative URLs carry no protocol and are accepted.
fn is_safe_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    // Entity-encoded colons hide a protocol from the check below.
    if compact.contains("&#") || compact.contains("&colon") {
        return false;
    }

    match compact.find(':') {
        Some(colon) if !compact[..colon].contains(['/', '?', '#']) => {
            ALLOWED_PROTOCOLS.contains(&&compact[..colon])
        }
        _ => true,
    }
}

fn quote_attr(value: &str) -> String {
    value
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
