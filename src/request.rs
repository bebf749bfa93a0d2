//! The read side of an HTTP context.

use std::collections::HashMap;

use bytes::Bytes;
use http::Method;
use serde_json::Value;
use url::{Position, Url};

use crate::error::{Error, Result};
use crate::headers::{HeaderMap, names};
use crate::host::HostRequest;

/// An incoming HTTP request, as handed over by the host.
///
/// Everything is read-only except the parsed body, which middleware may
/// replace with their own parse result, and the URL, which may be rewritten
/// through [`set_href`](Request::set_href).
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    original_url: String,
    headers: HeaderMap,
    body: Option<Value>,
    raw_body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn from_host(host: &HostRequest) -> Result<Self> {
        let method = Method::from_bytes(host.method.as_bytes())
            .map_err(|_| Error::InvalidMethod(host.method.clone()))?;
        let url = Url::parse(&host.url).map_err(|source| Error::InvalidUrl {
            url: host.url.clone(),
            source,
        })?;
        let original_url = host.original_url.clone().unwrap_or_else(|| host.url.clone());
        Ok(Self {
            method,
            url,
            original_url,
            headers: HeaderMap::cloned(&host.headers),
            body: host.body.clone(),
            raw_body: host.raw_body.clone(),
            params: host.params.clone(),
        })
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn raw_body(&self) -> &[u8] { &self.raw_body }
    pub fn params(&self) -> &HashMap<String, String> { &self.params }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Returns a named route parameter supplied by the host.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// The parsed body, if the host (or a middleware) parsed one.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Replaces the parsed body, e.g. with a middleware's own parse result.
    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Full URL: `https://www.example.com:443/login?campaign=summer`.
    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    /// Rewrites the URL. Every URL accessor follows the new value except
    /// [`original_url`](Request::original_url).
    pub fn set_href(&mut self, href: &str) -> Result {
        self.url = Url::parse(href).map_err(|source| Error::InvalidUrl {
            url: href.to_owned(),
            source,
        })?;
        Ok(())
    }

    /// The URL as the host first received it, unaffected by rewrites.
    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    /// Path with a leading `/`: `/login`.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Path and query: `/login?campaign=summer`.
    pub fn url(&self) -> &str {
        &self.url[Position::BeforePath..Position::AfterQuery]
    }

    /// Query string including the `?`, or empty: `?campaign=summer`.
    pub fn search(&self) -> &str {
        let search = &self.url[Position::AfterPath..Position::AfterQuery];
        if search.len() > 1 { search } else { "" }
    }

    /// Query string without the `?`: `campaign=summer`.
    pub fn querystring(&self) -> &str {
        self.url.query().unwrap_or("")
    }

    /// Decoded query pairs. Later duplicates win.
    pub fn query(&self) -> HashMap<String, String> {
        self.url.query_pairs().into_owned().collect()
    }

    /// Originating address: the last `x-forwarded-for` entry.
    pub fn ip(&self) -> Option<&str> {
        let forwarded = self.headers.get(names::X_FORWARDED_FOR)?;
        let last = forwarded.rsplit(',').next()?.trim();
        (!last.is_empty()).then_some(last)
    }
}
