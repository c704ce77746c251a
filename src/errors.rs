//! Error types.
//!
//! Every failure the tool can surface falls in one of these buckets:
//! - [`MalformedRequestError`]: the captured request cannot be turned into a
//!   replayable request. Always raised before any network activity.
//! - [`TransportError`]: a single HTTP exchange failed (connect, TLS, timeout).
//! - [`ConfigError`]: an invalid combination of run settings.
//!
//! [`Error`] wraps them for callers that just want to report and exit.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MalformedRequestError {
    #[error("request is empty: no request line found")]
    Empty,

    #[error("invalid request line {0:?}: expected METHOD PATH PROTOCOL")]
    InvalidRequestLine(String),

    #[error("invalid header on line {line_no}: {line:?} has no ':' separator")]
    InvalidHeader { line_no: usize, line: String },

    #[error("INVALID URL: request has no Host header")]
    MissingHost,

    #[error("INVALID URL: {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("timed out waiting for {url}")]
    Timeout { url: String },

    #[error("cannot connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("baseline delay must be non-zero")]
    ZeroBaselineDelay,

    #[error("concurrency level {0} is not supported: requests are always sent one at a time")]
    ConcurrencyUnsupported(usize),

    #[error("unsupported scheme {0:?} (expected \"http\" or \"https\")")]
    UnsupportedScheme(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot read request file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed request: {0}")]
    MalformedRequest(#[from] MalformedRequestError),

    #[error("baseline request failed, nothing to compare against: {0}")]
    Baseline(#[source] TransportError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
