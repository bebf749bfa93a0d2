//! # tandem
//!
//! Onion-style middleware for serverless functions.
//! Compose once, invoke many times.
//!
//! ## The contract
//!
//! The host platform parses requests, resolves routes, and triggers timers.
//! tandem does not. It receives an already-parsed invocation, threads one
//! mutable [`Context`] through an ordered chain of middleware, and writes a
//! single definite response back to the host once the chain has unwound.
//!
//! What the host already owns, and tandem ignores:
//!
//! - **HTTP parsing and routing**: the host resolves the function and its
//!   route parameters
//! - **Scheduling**: timer functions arrive with their metadata attached
//!
//! What's left for tandem:
//!
//! - Composition: `a → b → c → handler → C → B → A`, with double-`next`
//!   detection
//! - Response materialization: status, body, and content-type defaults settled
//!   deterministically
//! - A small hyper host ([`Server`]) for running an endpoint behind plain HTTP
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tandem::{App, Config, Error, Server, middleware::from_fn};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Error> {
//!     let app = App::new().with(from_fn(|ctx, next| Box::pin(async move {
//!         next.run(ctx).await?;
//!         if let Some(res) = ctx.response_mut() {
//!             res.set_header("x-powered-by", "tandem");
//!         }
//!         Ok::<_, Error>(())
//!     })));
//!
//!     let hello = app.endpoint(from_fn(|ctx, _next| Box::pin(async move {
//!         let name = ctx
//!             .request()
//!             .and_then(|req| req.query().get("name").cloned())
//!             .unwrap_or_else(|| "world".to_owned());
//!         if let Some(res) = ctx.response_mut() {
//!             // a string body: 200, text/plain
//!             res.set_body(format!("hello, {name}"));
//!         }
//!         Ok::<_, Error>(())
//!     })));
//!
//!     Server::from_config(Config::from_env()?).serve(hello).await
//! }
//! ```

mod app;
mod config;
mod context;
mod error;
mod host;
mod materialize;
mod request;
mod response;
mod server;
mod timer;

pub mod headers;
pub mod health;
pub mod middleware;

pub use app::{App, Endpoint, TimerFunction};
pub use config::Config;
pub use context::{Context, ContextKind, Trigger};
pub use error::{BoxError, Error, Result};
pub use headers::HeaderMap;
pub use host::{HostRequest, HostResponse, Invocation, Platform, PlatformInfo};
pub use materialize::{Materialized, Materializer, NoContentPolicy};
pub use middleware::{Middleware, Next, compose, from_fn};
pub use request::Request;
pub use response::{Body, ContentType, Response};
pub use server::Server;
pub use timer::{Schedule, ScheduleStatus, TimerInfo};
