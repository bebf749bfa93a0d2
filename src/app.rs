//! The dispatcher.
//!
//! An [`App`] is an ordered, immutable list of middleware. Adding middleware
//! never changes an existing `App`: [`App::with`] hands back a new one, so an
//! app can be shared, extended per endpoint family, and wired concurrently
//! without anyone seeing a chain change underneath them.
//!
//! ```rust
//! use tandem::{App, Error, middleware::from_fn};
//!
//! let base = App::new();
//! let logged = base.with(from_fn(|ctx, next| Box::pin(async move {
//!     tracing::info!(kind = %ctx.kind(), "invocation");
//!     next.run(ctx).await
//! })));
//!
//! assert_eq!(base.len(), 0);
//! assert_eq!(logged.len(), 1);
//!
//! let hello = logged.endpoint(from_fn(|ctx, _next| Box::pin(async move {
//!     if let Some(res) = ctx.response_mut() {
//!         res.set_body("hello");
//!     }
//!     Ok::<_, Error>(())
//! })));
//! # let _ = hello;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::host::{Invocation, Platform};
use crate::materialize::Materializer;
use crate::middleware::{BoxedMiddleware, Composed, Middleware, Next, compose};
use crate::request::Request;
use crate::timer::TimerInfo;

/// The application: global middleware plus response settings.
#[derive(Clone, Default)]
pub struct App {
    middleware: Vec<BoxedMiddleware>,
    materializer: Materializer,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new app with `middleware` appended. `self` is untouched.
    pub fn with(&self, middleware: impl Middleware) -> Self {
        let mut app = self.clone();
        app.middleware.push(Arc::new(middleware));
        app
    }

    /// Returns a new app that materializes responses with `materializer`.
    pub fn materializer(&self, materializer: Materializer) -> Self {
        Self { materializer, ..self.clone() }
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Snapshots the current middleware and appends `handler` as the last
    /// link.
    fn chain(&self, handler: impl Middleware) -> Composed {
        let handler: BoxedMiddleware = Arc::new(handler);
        compose(self.middleware.iter().cloned().chain([handler]))
    }

    /// Builds the host callable for an HTTP function.
    ///
    /// The middleware list is captured now; later `with` calls do not affect
    /// the endpoint.
    pub fn endpoint(&self, handler: impl Middleware) -> Endpoint {
        Endpoint {
            chain: self.chain(handler),
            materializer: self.materializer,
        }
    }

    /// Builds the host callable for a timer function. Timer invocations
    /// produce no response.
    pub fn timer(&self, handler: impl Middleware) -> TimerFunction {
        TimerFunction { chain: self.chain(handler) }
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("middleware", &self.middleware.len())
            .field("materializer", &self.materializer)
            .finish()
    }
}

// ── Host callables ────────────────────────────────────────────────────────────

/// Host callable for HTTP invocations.
#[derive(Clone, Debug)]
pub struct Endpoint {
    chain: Composed,
    materializer: Materializer,
}

impl Endpoint {
    /// Runs one invocation.
    ///
    /// Builds a fresh HTTP context, runs the chain to completion, then
    /// materializes the response into `invocation.response`. Any error from
    /// the chain or the materializer is returned as-is and the sink is left
    /// untouched.
    ///
    /// Logging is limited to `trace!` events at start and finish. Errors are
    /// returned, never logged here.
    pub async fn call(&self, invocation: &mut Invocation) -> Result {
        let request = invocation
            .request
            .as_ref()
            .ok_or(Error::MissingHostData("request"))?;
        let request = Request::from_host(request)?;
        let sink = invocation
            .response
            .as_mut()
            .ok_or(Error::MissingHostData("response"))?;

        let mut ctx = Context::http(invocation.platform.clone(), request);
        trace!(invocation_id = %ctx.platform().invocation_id, kind = %ctx.kind(), "invocation started");

        self.chain.run(&mut ctx, Next::end()).await?;

        let response = ctx.into_response().unwrap_or_default();
        self.materializer.materialize(response)?.write_to(sink);
        trace!(invocation_id = %invocation.platform.invocation_id, status = sink.status_code, "invocation finished");
        Ok(())
    }
}

/// Host callable for timer invocations.
#[derive(Clone, Debug)]
pub struct TimerFunction {
    chain: Composed,
}

impl TimerFunction {
    /// Runs one timer invocation over a fresh timer context. Nothing is
    /// materialized.
    ///
    /// As with [`Endpoint::call`], only `trace!` events are emitted and errors
    /// are returned unlogged.
    pub async fn call(&self, platform: Platform, info: TimerInfo) -> Result {
        let mut ctx = Context::timer(platform, info);
        trace!(invocation_id = %ctx.platform().invocation_id, kind = %ctx.kind(), "invocation started");
        self.chain.run(&mut ctx, Next::end()).await?;
        trace!(invocation_id = %ctx.platform().invocation_id, "invocation finished");
        Ok(())
    }
}
