//! Per-invocation context.
//!
//! A [`Context`] is created by the dispatcher for exactly one invocation and
//! dropped when it ends. What it carries depends on what triggered it: an
//! HTTP context has a request and a response, a timer context has schedule
//! metadata. The kind is fixed at construction.

use std::fmt;

use http::Extensions;

use crate::host::Platform;
use crate::request::Request;
use crate::response::Response;
use crate::timer::TimerInfo;

/// What triggered an invocation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContextKind {
    Unknown,
    Http,
    Timer,
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Http    => "http",
            Self::Timer   => "timer",
        })
    }
}

/// Trigger-specific data. Each variant carries only what is valid for it.
#[derive(Debug)]
pub enum Trigger {
    Unknown,
    Http { request: Request, response: Response },
    Timer(TimerInfo),
}

/// The mutable record threaded through the middleware chain.
#[derive(Debug)]
pub struct Context {
    trigger: Trigger,
    platform: Platform,
    extensions: Extensions,
}

impl Context {
    /// A context with no trigger data.
    pub fn new(platform: Platform) -> Self {
        Self::with_trigger(platform, Trigger::Unknown)
    }

    pub fn http(platform: Platform, request: Request) -> Self {
        let response = Response::default();
        Self::with_trigger(platform, Trigger::Http { request, response })
    }

    pub fn timer(platform: Platform, info: TimerInfo) -> Self {
        Self::with_trigger(platform, Trigger::Timer(info))
    }

    fn with_trigger(platform: Platform, trigger: Trigger) -> Self {
        Self { trigger, platform, extensions: Extensions::new() }
    }

    pub fn kind(&self) -> ContextKind {
        match self.trigger {
            Trigger::Unknown      => ContextKind::Unknown,
            Trigger::Http { .. }  => ContextKind::Http,
            Trigger::Timer(_)     => ContextKind::Timer,
        }
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn request(&self) -> Option<&Request> {
        match &self.trigger {
            Trigger::Http { request, .. } => Some(request),
            _ => None,
        }
    }

    /// Mutable request access. Only the parsed body can be changed.
    pub fn request_mut(&mut self) -> Option<&mut Request> {
        match &mut self.trigger {
            Trigger::Http { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match &self.trigger {
            Trigger::Http { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn response_mut(&mut self) -> Option<&mut Response> {
        match &mut self.trigger {
            Trigger::Http { response, .. } => Some(response),
            _ => None,
        }
    }

    pub fn timer_info(&self) -> Option<&TimerInfo> {
        match &self.trigger {
            Trigger::Timer(info) => Some(info),
            _ => None,
        }
    }

    /// Typed annotations middleware attach for later middleware.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub(crate) fn into_response(self) -> Option<Response> {
        match self.trigger {
            Trigger::Http { response, .. } => Some(response),
            _ => None,
        }
    }
}
