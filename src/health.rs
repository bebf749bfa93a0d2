//! Ready-made health-check handlers.
//!
//! | Probe | Question |
//! |---|---|
//! | **Liveness** | Is the process alive? Failure → restart. |
//! | **Readiness** | Can it serve traffic? Failure → pulled from the load-balancer. |
//!
//! Each is a terminal handler: hand it to [`App::endpoint`](crate::App::endpoint).
//!
//! ```rust,no_run
//! use tandem::{App, Server, health};
//!
//! # async fn run() -> Result<(), tandem::Error> {
//! let healthz = App::new().endpoint(health::liveness());
//! Server::bind("0.0.0.0:3000")?.serve(healthz).await
//! # }
//! ```
//!
//! Gate readiness on your own dependencies by writing your own handler that
//! sets status 503 when they are down.

use std::future;

use crate::error::Error;
use crate::middleware::{Middleware, from_fn};

/// Always answers `200 OK` with body `"ok"`. If the process can run a
/// handler at all, it is alive.
pub fn liveness() -> impl Middleware {
    text("ok")
}

/// Answers `200 OK` with body `"ready"`.
pub fn readiness() -> impl Middleware {
    text("ready")
}

fn text(body: &'static str) -> impl Middleware {
    from_fn(move |ctx, _next| {
        if let Some(res) = ctx.response_mut() {
            res.set_body(body);
        }
        Box::pin(future::ready(Ok::<_, Error>(())))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{HostRequest, Invocation, Platform};
    use crate::response::Body;
    use crate::App;

    #[tokio::test]
    async fn liveness_answers_ok() {
        let endpoint = App::new().endpoint(liveness());
        let mut invocation = Invocation::new(
            Platform::default(),
            HostRequest { method: "GET".into(), url: "http://localhost/healthz".into(), ..Default::default() },
        );
        endpoint.call(&mut invocation).await.unwrap();
        let res = invocation.response.unwrap();
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, Some(Body::from("ok")));
    }
}
