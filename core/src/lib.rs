//! Blocking HTTP client over an asynchronous, callback-based transport.
//!
//! # Overview
//! Every call builds one `HttpRequest`, hands it to a `Transport` together
//! with a `Completion` handle, and parks the calling thread until the
//! transport reports an outcome. The caller gets back a single
//! `NetworkResponse` holding the request, the status/header envelope, the body
//! and any transport error.
//!
//! # Design
//! - Request construction (`encode`, `builder`) is pure and never fails:
//!   unencodable values are skipped and bad URL compositions fall back to the
//!   input URL.
//! - `bridge::dispatch_blocking` waits on a one-shot latch; duplicate
//!   completions from a misbehaving transport are ignored.
//! - HTTP status codes are reported, not interpreted.
//! - The transport is owned by the client and injectable; `UreqTransport` is
//!   the default.
//! - The bridge has no timeout or cancellation. Bound the wait with the
//!   transport timeout (`ClientConfig::timeout`) or around the call.

pub mod bridge;
pub mod builder;
pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;

pub use bridge::{dispatch_blocking, Completion, Transport, TransportOutcome};
pub use client::SyncClient;
pub use config::ClientConfig;
pub use encode::{ParameterMap, JSON_CONTENT_TYPE};
pub use error::{ClientError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::NetworkResponse;
pub use transport::UreqTransport;
