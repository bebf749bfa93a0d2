//! What the host platform hands over per invocation, and where results go.
//!
//! tandem does not parse HTTP or route requests. Something upstream (a
//! serverless runtime, or the bundled [`Server`](crate::Server)) does that and
//! fills in an [`Invocation`]: a [`Platform`] handle, an already-parsed
//! [`HostRequest`], and an empty [`HostResponse`] sink. An
//! [`Endpoint`](crate::Endpoint) writes the sink exactly once, after the
//! middleware chain has fully unwound.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::headers::RawHeaders;
use crate::response::Body;

// ── Platform ─────────────────────────────────────────────────────────────────

/// Host-side details about one invocation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformInfo {
    pub invocation_id: String,
    pub function_name: String,
    /// Whatever else the host attached, untouched.
    #[serde(default)]
    pub metadata: Value,
}

/// Opaque, read-only handle to the host invocation.
///
/// Cloning is one atomic increment. Contexts carry it through the chain
/// without looking inside.
#[derive(Clone, Debug, Default)]
pub struct Platform(Arc<PlatformInfo>);

impl Platform {
    pub fn new(info: PlatformInfo) -> Self {
        Self(Arc::new(info))
    }
}

impl Deref for Platform {
    type Target = PlatformInfo;

    fn deref(&self) -> &PlatformInfo {
        &self.0
    }
}

impl From<PlatformInfo> for Platform {
    fn from(info: PlatformInfo) -> Self {
        Self::new(info)
    }
}

// ── Request / response ───────────────────────────────────────────────────────

/// An already-parsed request as the host delivers it.
#[derive(Clone, Debug, Default)]
pub struct HostRequest {
    pub method: String,
    /// Absolute URL, scheme and host included.
    pub url: String,
    /// The URL as first received, when a proxy or the host rewrote `url`.
    pub original_url: Option<String>,
    pub headers: RawHeaders,
    /// Body as parsed by the host, if it parsed one.
    pub body: Option<Value>,
    pub raw_body: Bytes,
    /// Route parameters resolved by the host.
    pub params: HashMap<String, String>,
}

/// The host's output sink.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostResponse {
    pub status_code: u16,
    pub headers: RawHeaders,
    pub body: Option<Body>,
}

/// One host invocation of an HTTP endpoint.
///
/// `request` and `response` are optional because hosts sometimes omit them.
/// An endpoint refuses to run without both.
#[derive(Debug, Default)]
pub struct Invocation {
    pub platform: Platform,
    pub request: Option<HostRequest>,
    pub response: Option<HostResponse>,
}

impl Invocation {
    /// An invocation with `request` and an empty response sink.
    pub fn new(platform: Platform, request: HostRequest) -> Self {
        Self {
            platform,
            request: Some(request),
            response: Some(HostResponse::default()),
        }
    }
}
