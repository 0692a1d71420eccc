//! The single value returned by every blocking call.

use serde::de::DeserializeOwned;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Outcome of one dispatched request, transcribed from the transport.
///
/// On success `response` and usually `data` are set and `error` is `None`;
/// on a transport failure `error` is set and the others are normally `None`.
/// Non-2xx statuses are not errors here; check `status()` or
/// `is_success()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkResponse {
    /// The request that was dispatched. `None` only if nothing was sent.
    pub request: Option<HttpRequest>,
    pub response: Option<HttpResponse>,
    pub data: Option<Vec<u8>>,
    pub error: Option<TransportError>,
}

impl NetworkResponse {
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    /// `true` when a response arrived with a 2xx status and no error.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.response.as_ref().is_some_and(HttpResponse::is_success)
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Option<String> {
        self.data
            .as_deref()
            .map(|d| String::from_utf8_lossy(d).into_owned())
    }

    /// Deserialize the body as JSON. `None` when there is no body.
    pub fn json<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.data.as_deref().map(serde_json::from_slice)
    }
}
