//! Minimal tandem example: a JSON greeting endpoint behind two middleware.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i 'http://localhost:3000/greet?name=alice'
//!   curl -i -X POST http://localhost:3000/greet \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"bob"}'
//!   curl -i -X DELETE http://localhost:3000/greet

use std::time::Instant;

use http::Method;
use serde_json::json;
use tandem::{App, Config, Context, Next, Result, Server, middleware::from_fn};

#[tokio::main]
async fn main() -> Result {
    tracing_subscriber::fmt::init();

    let app = App::new()
        .with(from_fn(|ctx, next| Box::pin(timing(ctx, next))))
        .with(from_fn(|ctx, next| Box::pin(powered_by(ctx, next))));

    let greet = app.endpoint(from_fn(|ctx, _next| Box::pin(greet(ctx))));

    Server::from_config(Config::from_env()?).serve(greet).await
}

// Outermost: sees the response after everything else has run.
async fn timing(ctx: &mut Context, next: Next) -> Result {
    let started = Instant::now();
    next.run(ctx).await?;
    let status = ctx.response().and_then(|res| res.status());
    tracing::info!(
        invocation_id = %ctx.platform().invocation_id,
        ?status,
        elapsed_us = started.elapsed().as_micros() as u64,
        "handled"
    );
    Ok(())
}

async fn powered_by(ctx: &mut Context, next: Next) -> Result {
    next.run(ctx).await?;
    if let Some(res) = ctx.response_mut() {
        res.set_header("X-Powered-By", "tandem");
    }
    Ok(())
}

// GET    -> {"greeting": "..."}         200, application/json
// POST   -> same, name taken from body  201
// DELETE -> null body                   204, no content-type
async fn greet(ctx: &mut Context) -> Result {
    let Some(req) = ctx.request() else { return Ok(()) };
    let method = req.method().clone();
    let name = match method {
        Method::POST => req.body().and_then(|b| b.get("name")).and_then(|n| n.as_str()).map(str::to_owned),
        _ => req.query().get("name").cloned(),
    }
    .unwrap_or_else(|| "world".to_owned());

    let Some(res) = ctx.response_mut() else { return Ok(()) };
    match method {
        Method::GET => res.set_body(json!({ "greeting": format!("hello, {name}") })),
        Method::POST => {
            res.set_status(201u16);
            res.set_body(json!({ "greeting": format!("welcome, {name}") }));
        }
        Method::DELETE => res.set_body(serde_json::Value::Null),
        // status only: sent without a body
        _ => res.set_status(405u16),
    }
    Ok(())
}
