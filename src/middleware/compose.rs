//! Chain composition.
//!
//! [`compose`] is pure construction: it collects the middleware into a shared
//! slice and does nothing else. Each [`Composed::run`] gets its own dispatch
//! cursor, so one composed chain serves any number of concurrent invocations
//! without state leaking between them.

use std::fmt;
use std::future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{BoxFuture, BoxedMiddleware, Middleware};
use crate::context::Context;
use crate::error::{Error, Result};

/// Composes `middleware` into a single middleware.
///
/// The composed chain's own `next` is substituted for the step past its last
/// element, so composed chains nest inside larger ones.
pub fn compose<I>(middleware: I) -> Composed
where
    I: IntoIterator<Item = BoxedMiddleware>,
{
    Composed { chain: middleware.into_iter().collect() }
}

/// An ordered chain of middleware, callable as one.
#[derive(Clone)]
pub struct Composed {
    chain: Arc<[BoxedMiddleware]>,
}

impl Composed {
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Runs the chain over `ctx`. Calling `next` from the last element runs
    /// `next` here.
    pub fn run<'a>(&self, ctx: &'a mut Context, next: Next) -> BoxFuture<'a, Result> {
        let link = Link {
            chain: Arc::clone(&self.chain),
            cursor: Arc::new(Cursor::default()),
            index: 0,
            outer: Arc::new(next),
        };
        link.dispatch(ctx)
    }
}

impl Middleware for Composed {
    fn call<'a>(&'a self, ctx: &'a mut Context, next: Next) -> BoxFuture<'a, Result> {
        self.run(ctx, next)
    }
}

impl fmt::Debug for Composed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composed").field("len", &self.len()).finish()
    }
}

// ── Next ──────────────────────────────────────────────────────────────────────

/// The continuation handed to each middleware.
///
/// Running it yields control to the rest of the chain and completes once
/// everything downstream has completed. A `Next` may be run at most once;
/// running it again fails with [`Error::NextCalledMultipleTimes`] naming the
/// position whose `next` it was. The `Next` given to the last element of a
/// chain is valid to run and does nothing further.
#[derive(Clone, Default)]
pub struct Next {
    link: Option<Link>,
}

impl Next {
    /// A continuation that completes immediately.
    pub fn end() -> Self {
        Self::default()
    }

    pub fn run<'a>(&self, ctx: &'a mut Context) -> BoxFuture<'a, Result> {
        match &self.link {
            Some(link) => link.clone().dispatch(ctx),
            None => Box::pin(future::ready(Ok(()))),
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.link {
            Some(link) => f.debug_struct("Next").field("index", &link.index).finish(),
            None => f.write_str("Next(end)"),
        }
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// Number of positions dispatched so far in one run, i.e. last index + 1.
#[derive(Default)]
struct Cursor(AtomicUsize);

impl Cursor {
    fn advance(&self, index: usize) -> Result {
        let dispatched = self.0.fetch_max(index + 1, Ordering::AcqRel);
        if dispatched > index {
            // `index` is only ever reached through the `next` of `index - 1`.
            return Err(Error::NextCalledMultipleTimes { position: index.saturating_sub(1) });
        }
        Ok(())
    }
}

#[derive(Clone)]
struct Link {
    chain: Arc<[BoxedMiddleware]>,
    cursor: Arc<Cursor>,
    index: usize,
    outer: Arc<Next>,
}

impl Link {
    fn dispatch<'a>(self, ctx: &'a mut Context) -> BoxFuture<'a, Result> {
        if let Err(e) = self.cursor.advance(self.index) {
            return Box::pin(future::ready(Err(e)));
        }
        match self.chain.get(self.index).cloned() {
            Some(middleware) => {
                let next = Next {
                    link: Some(Link { index: self.index + 1, ..self }),
                };
                Box::pin(async move { middleware.call(ctx, next).await })
            }
            None => self.outer.run(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Platform;
    use crate::middleware::from_fn;

    #[test]
    fn cursor_rejects_repeats() {
        let cursor = Cursor::default();
        assert!(cursor.advance(0).is_ok());
        assert!(cursor.advance(1).is_ok());
        assert!(cursor.advance(2).is_ok());
        assert!(matches!(
            cursor.advance(1),
            Err(Error::NextCalledMultipleTimes { position: 0 })
        ));
        assert!(matches!(
            cursor.advance(2),
            Err(Error::NextCalledMultipleTimes { position: 1 })
        ));
        assert!(cursor.advance(3).is_ok());
    }

    #[tokio::test]
    async fn empty_chain_runs_outer_next() {
        let reached = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reached);
        let counting = compose([Arc::new(from_fn(move |_ctx, _next| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(future::ready(Ok::<_, Error>(())))
        })) as BoxedMiddleware]);

        let empty = compose([]);
        assert!(empty.is_empty());

        let mut ctx = Context::new(Platform::default());
        let nested = compose([Arc::new(empty) as BoxedMiddleware, Arc::new(counting) as BoxedMiddleware]);
        nested.run(&mut ctx, Next::end()).await.unwrap();
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn end_is_a_no_op() {
        let mut ctx = Context::new(Platform::default());
        let next = Next::end();
        next.run(&mut ctx).await.unwrap();
        next.run(&mut ctx).await.unwrap();
    }
}
