//! Middleware gated on the context kind.
//!
//! ```rust
//! use tandem::middleware::{from_fn, timer_only};
//!
//! // runs for timer invocations, passes straight through for HTTP ones
//! let overdue = timer_only(from_fn(|ctx, next| Box::pin(async move {
//!     if ctx.timer_info().is_some_and(|t| t.is_past_due) {
//!         tracing::warn!("timer is running late");
//!     }
//!     next.run(ctx).await
//! })));
//! # let _ = overdue;
//! ```

use super::{BoxFuture, Middleware, Next};
use crate::context::{Context, ContextKind};
use crate::error::Result;

/// Runs the wrapped middleware only for contexts of one kind; any other
/// context goes straight to `next`.
#[derive(Clone, Debug)]
pub struct KindGate<M> {
    kind: ContextKind,
    inner: M,
}

impl<M> KindGate<M> {
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M: Middleware> Middleware for KindGate<M> {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next) -> BoxFuture<'a, Result> {
        if ctx.kind() == self.kind {
            self.inner.call(ctx, next)
        } else {
            next.run(ctx)
        }
    }
}

pub fn only<M: Middleware>(kind: ContextKind, middleware: M) -> KindGate<M> {
    KindGate { kind, inner: middleware }
}

pub fn http_only<M: Middleware>(middleware: M) -> KindGate<M> {
    only(ContextKind::Http, middleware)
}

pub fn timer_only<M: Middleware>(middleware: M) -> KindGate<M> {
    only(ContextKind::Timer, middleware)
}
