//! Middleware and the onion.
//!
//! A middleware receives the [`Context`] and a [`Next`] continuation. Work done
//! before `next.run(ctx).await` happens on the way in; work done after it
//! happens on the way out, once everything downstream has finished:
//!
//! ```text
//!   a ─┐                      ┌─ A
//!      b ─┐                ┌─ B
//!         c ─┐          ┌─ C
//!            └ handler ─┘
//! ```
//!
//! Not calling `next` stops the chain there. Calling it twice is a bug and is
//! reported as [`Error::NextCalledMultipleTimes`](crate::Error).
//!
//! # How middleware are stored
//!
//! Chains hold middleware of different concrete types, so each one is erased
//! behind `Arc<dyn Middleware>` once, at wiring time. Each step at request
//! time costs one `Arc` clone and one virtual call.
//!
//! Closures go through [`from_fn`], which pins down the higher-ranked
//! signature the compiler needs:
//!
//! ```rust
//! use tandem::{Error, middleware::from_fn};
//!
//! let server_header = from_fn(|ctx, next| Box::pin(async move {
//!     next.run(ctx).await?;
//!     if let Some(res) = ctx.response_mut() {
//!         res.set_header("Server", "tandem");
//!     }
//!     Ok::<_, Error>(())
//! }));
//! # let _ = server_header;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::Result;

mod compose;
mod kind;

pub use compose::{Composed, Next, compose};
pub use kind::{KindGate, http_only, only, timer_only};

/// A heap-allocated, type-erased future.
///
/// `Send` so the host may drive invocations on any worker thread.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A middleware shared across concurrent invocations.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A step in the chain.
///
/// The returned future borrows the context for as long as it runs; `next`
/// is owned so it can be moved into that future.
pub trait Middleware: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next) -> BoxFuture<'a, Result>;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next) -> BoxFuture<'a, Result> {
        (**self).call(ctx, next)
    }
}

impl<M: Middleware + ?Sized> Middleware for Box<M> {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next) -> BoxFuture<'a, Result> {
        (**self).call(ctx, next)
    }
}

/// Middleware built from a closure. See [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F>(F);

/// Turns a closure into a [`Middleware`].
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next) -> BoxFuture<'a, Result> + Send + Sync + 'static,
{
    FromFn(f)
}

impl<F> Middleware for FromFn<F>
where
    F: for<'a> Fn(&'a mut Context, Next) -> BoxFuture<'a, Result> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next) -> BoxFuture<'a, Result> {
        (self.0)(ctx, next)
    }
}
