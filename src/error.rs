//! Unified error type.

use thiserror::Error;

/// A boxed error raised by application middleware.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used across the crate.
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// The error type returned by tandem's fallible operations.
///
/// Nothing here is retried or logged by the framework. Every variant travels
/// up to whoever invoked the host callable.
#[derive(Debug, Error)]
pub enum Error {
    /// A middleware called `next` more than once.
    #[error("next() called multiple times by middleware at position {position}")]
    NextCalledMultipleTimes { position: usize },

    /// The response left behind by the chain carries an unusable status.
    #[error("\"{0}\" is not a valid HTTP status")]
    InvalidStatus(u16),

    /// The host invocation did not carry something an endpoint needs.
    #[error("expected host invocation to carry a {0}")]
    MissingHostData(&'static str),

    #[error("invalid request url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid request method `{0}`")]
    InvalidMethod(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// An application error, passed through the chain untouched.
    #[error(transparent)]
    Handler(BoxError),
}

impl Error {
    /// Wraps an application error so it can travel through the chain.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        Self::Handler(err.into())
    }
}
