//! Blocking dispatch over a callback-based transport.
//!
//! # Design
//! A transport receives the request together with a `Completion` handle and
//! reports the outcome by calling `Completion::complete`, from any thread.
//! `dispatch_blocking` parks the calling thread on a one-shot latch until
//! that happens.
//!
//! The latch can be signalled once. An atomic flag decides which
//! `complete` call wins; the winner stores the outcome under the latch
//! mutex and then notifies, so the waiter can never observe a partly written
//! outcome. Later calls are logged and dropped.
//!
//! There is no timeout and no cancellation. A transport that never calls
//! `complete` leaves the caller blocked forever; callers that need a bound
//! must enforce it around the call, or configure one in the transport.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};
use crate::response::NetworkResponse;

/// What a transport reports for one request: body bytes, status/header
/// envelope and error, each optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOutcome {
    pub data: Option<Vec<u8>>,
    pub response: Option<HttpResponse>,
    pub error: Option<TransportError>,
}

impl TransportOutcome {
    pub fn success(response: HttpResponse, data: Option<Vec<u8>>) -> Self {
        Self {
            data,
            response: Some(response),
            error: None,
        }
    }

    pub fn failure(error: TransportError) -> Self {
        Self {
            data: None,
            response: None,
            error: Some(error),
        }
    }
}

/// An asynchronous HTTP transport.
///
/// `submit` must return without waiting for the network and must arrange
/// for `completion.complete(..)` to be called once the request finishes.
/// It may call it before returning, or later from another thread.
pub trait Transport: Send + Sync {
    fn submit(&self, request: HttpRequest, completion: Completion);
}

impl<F> Transport for F
where
    F: Fn(HttpRequest, Completion) + Send + Sync,
{
    fn submit(&self, request: HttpRequest, completion: Completion) {
        self(request, completion)
    }
}

/// Single-assignment slot with a blocking reader.
struct Latch<T> {
    fired: AtomicBool,
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> Latch<T> {
    fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Store `value` and wake waiters. Returns `false` without touching the
    /// slot if the latch was already signalled.
    fn signal(&self, value: T) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        let mut slot = self.slot.lock();
        *slot = Some(value);
        self.ready.notify_all();
        true
    }

    fn is_signalled(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Block until signalled, then take the value.
    fn wait(&self) -> T {
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            self.ready.wait(&mut slot);
        }
    }
}

/// Handle a transport uses to report the outcome of one request.
///
/// Cheap to clone. Only the first `complete` across all clones is recorded.
#[derive(Clone)]
pub struct Completion {
    latch: Arc<Latch<TransportOutcome>>,
}

impl Completion {
    fn new() -> (Self, Arc<Latch<TransportOutcome>>) {
        let latch = Arc::new(Latch::new());
        (
            Self {
                latch: Arc::clone(&latch),
            },
            latch,
        )
    }

    /// Report the outcome. Returns `true` if this call released the waiting
    /// caller and `false` if the request had already been completed.
    pub fn complete(&self, outcome: TransportOutcome) -> bool {
        let accepted = self.latch.signal(outcome);
        if !accepted {
            tracing::warn!("transport completed a request more than once, ignoring");
        }
        accepted
    }

    pub fn is_completed(&self) -> bool {
        self.latch.is_signalled()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Submit `request` to `transport` and block until it reports an outcome.
pub fn dispatch_blocking<T>(transport: &T, request: HttpRequest) -> NetworkResponse
where
    T: Transport + ?Sized,
{
    let (completion, latch) = Completion::new();
    tracing::debug!(method = %request.method(), url = %request.url(), "dispatching request");

    transport.submit(request.clone(), completion);
    let outcome = latch.wait();

    tracing::debug!(
        method = %request.method(),
        url = %request.url(),
        status = outcome.response.as_ref().map(|r| r.status),
        failed = outcome.error.is_some(),
        "request completed"
    );
    NetworkResponse {
        request: Some(request),
        response: outcome.response,
        data: outcome.data,
        error: outcome.error,
    }
}
