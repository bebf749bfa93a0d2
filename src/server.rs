//! HTTP host for a single endpoint, with graceful shutdown.
//!
//! Serverless platforms that forward invocations over plain HTTP (custom
//! handlers) only need something that turns each request into an
//! [`Invocation`], runs the [`Endpoint`], and writes the sink back out. That
//! is all this module does. There is no routing: one server, one endpoint.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Lets every in-flight connection task run to completion.
//! 3. Returns from [`Server::serve`].

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{StatusCode, request::Parts};
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::app::Endpoint;
use crate::config::Config;
use crate::error::Error;
use crate::headers::names;
use crate::host::{HostRequest, HostResponse, Invocation, Platform, PlatformInfo};
use crate::response::ContentType;

/// The HTTP host.
pub struct Server {
    addr: SocketAddr,
    function_name: String,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use tandem::Server;
    /// let server = Server::bind("0.0.0.0:3000")?;
    /// # Ok::<_, tandem::Error>(())
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| Error::Config(format!("invalid socket address `{addr}`: {e}")))?;
        Ok(Self::from_config(Config { addr, ..Config::default() }))
    }

    pub fn from_config(config: Config) -> Self {
        Self { addr: config.addr, function_name: config.function_name }
    }

    /// Serves `endpoint` until SIGTERM or Ctrl-C, then drains in-flight
    /// connections.
    pub async fn serve(self, endpoint: Endpoint) -> Result<(), Error> {
        self.serve_with_shutdown(endpoint, shutdown_signal()).await
    }

    /// Serves `endpoint` until `signal` resolves, then drains in-flight
    /// connections.
    pub async fn serve_with_shutdown<F>(self, endpoint: Endpoint, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.addr).await?;
        let host = Arc::new(Host {
            endpoint,
            function_name: self.function_name,
            sequence: AtomicU64::new(0),
        });

        info!(addr = %self.addr, function = %host.function_name, "tandem listening");

        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM stops accepting at once,
                // even if more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let host = Arc::clone(&host);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let host = Arc::clone(&host);
                            async move { host.dispatch(req).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // reap finished connections as they complete
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("tandem stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

struct Host {
    endpoint: Endpoint,
    function_name: String,
    sequence: AtomicU64,
}

impl Host {
    /// One request in, one response out. Endpoint errors become a bare status
    /// from [`error_status`]; hyper never sees an error.
    async fn dispatch(
        &self,
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<http::Response<Full<Bytes>>, std::convert::Infallible> {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!("failed to read request body: {e}");
                return Ok(status_only(StatusCode::BAD_REQUEST));
            }
        };

        let platform = Platform::new(PlatformInfo {
            invocation_id: self.sequence.fetch_add(1, Ordering::Relaxed).to_string(),
            function_name: self.function_name.clone(),
            ..PlatformInfo::default()
        });
        let mut invocation = Invocation::new(platform, host_request(&parts, body));

        if let Err(e) = self.endpoint.call(&mut invocation).await {
            let status = error_status(&e);
            if status.is_server_error() {
                error!(invocation_id = %invocation.platform.invocation_id, "invocation failed: {e}");
            } else {
                warn!(invocation_id = %invocation.platform.invocation_id, "rejected request: {e}");
            }
            return Ok(status_only(status));
        }

        Ok(into_http(invocation.response.unwrap_or_default()))
    }
}

/// Rebuilds an absolute URL and parses JSON bodies the way a function host
/// would before handing the request over.
fn host_request(parts: &Parts, raw_body: Bytes) -> HostRequest {
    let headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            let value = value.to_str().ok()?;
            Some((name.as_str().to_owned(), value.to_owned()))
        })
        .collect();

    let authority = parts
        .uri
        .authority()
        .map(|a| a.as_str().to_owned())
        .or_else(|| {
            parts.headers.get(http::header::HOST)?.to_str().ok().map(str::to_owned)
        })
        .unwrap_or_else(|| "localhost".to_owned());
    let scheme = parts.uri.scheme_str().unwrap_or("http");
    let path = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());

    let is_json = parts
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(ContentType::Json.as_str()));
    let body = if is_json { serde_json::from_slice(&raw_body).ok() } else { None };

    HostRequest {
        method: parts.method.as_str().to_owned(),
        url: format!("{scheme}://{authority}{path}"),
        original_url: None,
        headers,
        body,
        raw_body,
        params: Default::default(),
    }
}

fn into_http(sink: HostResponse) -> http::Response<Full<Bytes>> {
    let body = sink.body.as_ref().map(|b| b.to_bytes()).unwrap_or_default();
    let mut res = http::Response::new(Full::new(body));
    *res.status_mut() = StatusCode::from_u16(sink.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    for (name, value) in sink.headers {
        // hyper computes the length itself
        if name.eq_ignore_ascii_case(names::CONTENT_LENGTH) {
            continue;
        }
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                res.headers_mut().append(name, value);
            }
            _ => warn!(header = %name, "dropping unrepresentable response header"),
        }
    }
    res
}

/// Request data the client got wrong is a 400; everything else is ours.
fn error_status(err: &Error) -> StatusCode {
    match err {
        Error::InvalidUrl { .. } | Error::InvalidMethod(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn status_only(status: StatusCode) -> http::Response<Full<Bytes>> {
    let mut res = http::Response::new(Full::new(Bytes::new()));
    *res.status_mut() = status;
    res
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C). On
/// Windows only Ctrl-C is available. A handler that cannot be installed never
/// fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    // `pending()` never resolves: on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
