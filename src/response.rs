//! The write side of an HTTP context.
//!
//! Middleware fill in whatever they care about. Anything left untouched stays
//! *unset*, which is not the same thing as set-to-nothing: a body of JSON
//! `null` is a deliberate choice, a missing body is not. The
//! [`Materializer`](crate::Materializer) turns whatever is left
//! into a definite response.

use bytes::Bytes;
use serde_json::Value;

use crate::headers::{HeaderMap, RawHeaders, names};

// ── ContentType ───────────────────────────────────────────────────────────────

/// Content types the framework itself picks as defaults.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Html,        // text/html
    Json,        // application/json
    OctetStream, // application/octet-stream
    Text,        // text/plain
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html        => "text/html",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Text        => "text/plain",
        }
    }
}

// ── Body ──────────────────────────────────────────────────────────────────────

/// A response body.
///
/// Most bodies are JSON values, including plain strings and `null`. Raw bytes
/// are sent as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Json(Value),
    Bytes(Bytes),
}

impl Body {
    /// The explicit "no content" body.
    pub const fn null() -> Self {
        Self::Json(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Bytes(_) => None,
        }
    }

    /// The content type implied by the body's shape, if it implies one.
    ///
    /// Strings are text, arrays/objects/booleans are JSON. Numbers and raw
    /// bytes imply nothing.
    pub fn implied_content_type(&self) -> Option<ContentType> {
        match self {
            Self::Json(Value::String(_)) => Some(ContentType::Text),
            Self::Json(Value::Array(_) | Value::Object(_) | Value::Bool(_)) => Some(ContentType::Json),
            _ => None,
        }
    }

    /// Wire encoding. Strings go out verbatim, other JSON is serialised.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Json(Value::String(s)) => Bytes::copy_from_slice(s.as_bytes()),
            Self::Json(v) => Bytes::from(v.to_string()),
            Self::Bytes(b) => b.clone(),
        }
    }
}

impl From<Value> for Body {
    fn from(v: Value) -> Self { Self::Json(v) }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self { Self::Json(Value::String(s.to_owned())) }
}

impl From<String> for Body {
    fn from(s: String) -> Self { Self::Json(Value::String(s)) }
}

impl From<bool> for Body {
    fn from(b: bool) -> Self { Self::Json(Value::Bool(b)) }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self { Self::Bytes(b) }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self { Self::Bytes(Bytes::from(b)) }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// Response fields as middleware left them.
///
/// `status` and `body` start unset (`None`). Headers start empty.
///
/// ```rust
/// use tandem::Response;
///
/// let mut res = Response::default();
/// assert!(res.status().is_none());
///
/// res.set_status(201u16);
/// res.set_header("Location", "/users/42");
/// res.set_body(serde_json::json!({ "id": 42 }));
///
/// assert_eq!(res.header("location"), Some("/users/42"));
/// ```
#[derive(Debug, Default)]
pub struct Response {
    status: Option<u16>,
    body: Option<Body>,
    headers: HeaderMap,
}

impl Response {
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Accepts a bare `u16` or an [`http::StatusCode`]. The range is only
    /// checked at materialization.
    pub fn set_status(&mut self, status: impl Into<u16>) {
        self.status = Some(status.into());
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = Some(body.into());
    }

    /// Takes the body out, leaving it unset.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Replaces every header with a copy of `raw`.
    pub fn replace_headers(&mut self, raw: &RawHeaders) {
        self.headers = HeaderMap::cloned(raw);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.has(name)
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(name)
    }

    /// Sets the `content-type` header, which always wins over defaults.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.headers.set(names::CONTENT_TYPE, content_type);
    }

    pub(crate) fn into_parts(self) -> (Option<u16>, Option<Body>, HeaderMap) {
        (self.status, self.body, self.headers)
    }
}
