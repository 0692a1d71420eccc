//! Error types for the blocking client.
//!
//! # Design
//! Network-level failures never surface as `Err`: they are reported by the
//! transport and carried in-band in `NetworkResponse::error` as a
//! `TransportError`. Variants hold rendered messages rather than source
//! errors so the value is `Clone + PartialEq` and can be compared in tests
//! and copied across the FFI boundary.
//!
//! `ClientError` is reserved for programmer errors caught at construction
//! time, such as a base URL that cannot carry a path.

use thiserror::Error;

/// A failure reported by a transport instead of a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request did not finish within the transport's own timeout.
    #[error("request timed out")]
    Timeout,

    /// DNS resolution, connect or TLS handshake failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The connection broke while sending or receiving.
    #[error("I/O error: {0}")]
    Io(String),

    /// The peer sent something that is not valid HTTP, or the request could
    /// not be encoded.
    #[error("HTTP protocol error: {0}")]
    Http(String),

    /// The transport has been shut down and accepts no more requests.
    #[error("transport is closed")]
    Closed,
}

/// Errors raised while constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL did not parse.
    #[error("invalid base URL `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The base URL parsed but cannot have path segments appended
    /// (for example `mailto:` or `data:` URLs).
    #[error("base URL `{0}` cannot be used as a base")]
    CannotBeABase(String),

    /// A configuration value was out of range or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
