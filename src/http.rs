//! Framework-neutral request and response types for the admin page
//!
//! The host adapts its own HTTP layer to [`Request`] and writes the returned
//! [`Response`] back out.

use crate::auth::Caller;
use crate::transfer::{ExportFile, Upload};
use log::warn;
use serde_json::{Map, Value};
use std::collections::HashMap;
use url::form_urlencoded;

/// Form flag set by the export button
pub const EXPORT_FLAG: &str = "asm_export_settings";

/// File input name of the import form
pub const UPLOAD_FIELD: &str = "settings_import";

/// Deepest bracket nesting accepted in a field name; deeper names are dropped
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

// =============================================================================
// Form Data
// =============================================================================

/// Decoded form body with bracketed names expanded into nested objects
///
/// `opts[general][api_key]=k` becomes `{"opts": {"general": {"api_key": "k"}}}`
/// and `tags[]=a&tags[]=b` becomes `{"tags": ["a", "b"]}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Map<String, Value>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an `application/x-www-form-urlencoded` body
    pub fn from_urlencoded(body: &str) -> Self {
        let mut form = Self::new();
        for (name, value) in form_urlencoded::parse(body.as_bytes()) {
            form.insert(&name, Value::String(value.into_owned()));
        }
        form
    }

    /// Set one field by its (possibly bracketed) name; later values win
    pub fn insert(&mut self, name: &str, value: Value) {
        let (head, path) = split_name(name);
        if head.is_empty() {
            return;
        }
        if path.len() > MAX_NESTING {
            warn!("Dropping form field {head:?} nested deeper than {MAX_NESTING} levels");
            return;
        }
        if path.is_empty() {
            self.fields.insert(head.to_string(), value);
            return;
        }
        let slot = self
            .fields
            .entry(head.to_string())
            .or_insert(Value::Null);
        assign(slot, &path, value);
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Top-level field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Top-level field as a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// All fields as one JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// Split `a[b][c]` into `("a", ["b", "c"])`
///
/// Text after an unbalanced `[` is kept in the head, as PHP-style parsers do.
/// Scanning stops one segment past [`MAX_NESTING`].
fn split_name(name: &str) -> (&str, Vec<&str>) {
    let Some(open) = name.find('[') else {
        return (name, Vec::new());
    };
    let head = &name[..open];
    let mut path = Vec::new();
    let mut rest = &name[open..];
    while let Some(stripped) = rest.strip_prefix('[') {
        let Some(close) = stripped.find(']') else {
            break;
        };
        path.push(&stripped[..close]);
        if path.len() > MAX_NESTING {
            break;
        }
        rest = &stripped[close + 1..];
    }
    if path.is_empty() {
        return (name, path);
    }
    (head, path)
}

fn assign(slot: &mut Value, path: &[&str], value: Value) {
    let mut slot = slot;
    for segment in path {
        slot = child(slot, segment);
    }
    *slot = value;
}

/// Step into `segment`, turning `slot` into an array (`[]`) or object first
fn child<'v>(slot: &'v mut Value, segment: &str) -> &'v mut Value {
    if segment.is_empty() {
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
    } else if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }

    match slot {
        Value::Array(items) => {
            items.push(Value::Null);
            let last = items.len() - 1;
            &mut items[last]
        }
        Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
        other => other,
    }
}

// =============================================================================
// Request
// =============================================================================

/// One request to the admin page
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub query: HashMap<String, String>,
    pub form: FormData,
    pub upload: Option<Upload>,
    pub caller: Caller,
}

impl Request {
    /// A GET request with no query parameters
    pub fn get(caller: Caller) -> Self {
        Self {
            method: Method::Get,
            query: HashMap::new(),
            form: FormData::new(),
            upload: None,
            caller,
        }
    }

    /// A POST request with a decoded form body
    pub fn post(caller: Caller, form: FormData) -> Self {
        Self {
            method: Method::Post,
            form,
            ..Self::get(caller)
        }
    }

    /// Add one query parameter
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Add every parameter of a raw query string (`page=x&tab=email`)
    #[must_use]
    pub fn with_query_string(mut self, query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        self.query
            .extend(form_urlencoded::parse(query.as_bytes()).into_owned());
        self
    }

    /// Attach an uploaded file
    #[must_use]
    pub fn with_upload(mut self, upload: Upload) -> Self {
        self.upload = Some(upload);
        self
    }

    /// The `tab` query parameter
    pub fn tab(&self) -> Option<&str> {
        self.query.get("tab").map(String::as_str)
    }

    /// The attached file, unless it is empty
    pub fn attached_upload(&self) -> Option<&Upload> {
        self.upload.as_ref().filter(|u| !u.is_empty())
    }
}

// =============================================================================
// Response
// =============================================================================

/// What the host should send back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// 200 with an HTML body
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".into(), "text/html; charset=UTF-8".into())],
            body: body.into_bytes(),
        }
    }

    /// 303 See Other to `location`
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 303,
            headers: vec![("Location".into(), location.into())],
            body: Vec::new(),
        }
    }

    /// 200 file download
    pub fn attachment(file: ExportFile) -> Self {
        Self {
            status: 200,
            headers: file.headers(),
            body: file.body.into_bytes(),
        }
    }

    /// Empty 403
    pub fn forbidden() -> Self {
        Self {
            status: 403,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// First header with `name` (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body as text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
