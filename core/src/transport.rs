//! Default `Transport`: a pool of worker threads running `ureq`.
//!
//! # Design
//! `submit` only enqueues the request; a worker thread performs the
//! round-trip and calls `Completion::complete` from that thread. Status codes
//! are never turned into errors (`http_status_as_error(false)`), so 4xx/5xx
//! responses reach the caller as ordinary envelopes.
//!
//! Bodies are read in full unless `ClientConfig::body_limit` is set. A body
//! that cannot be read (too large, connection cut mid-body) fails the whole
//! request: the outcome carries the error alone, never a partial envelope.
//!
//! Dropping the transport closes the queue. Workers finish the requests
//! already queued and exit; requests submitted after shutdown complete
//! immediately with `TransportError::Closed`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, SendError, Sender};

use crate::bridge::{Completion, Transport, TransportOutcome};
use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

struct Job {
    request: HttpRequest,
    completion: Completion,
}

/// `Transport` backed by a shared `ureq::Agent` and a fixed set of worker
/// threads.
pub struct UreqTransport {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .new_agent();

        let body_limit = config.body_limit.unwrap_or(u64::MAX);
        let (sender, receiver) = unbounded::<Job>();
        let mut workers = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let receiver = receiver.clone();
            let agent = agent.clone();
            let handle = thread::Builder::new()
                .name(format!("synchttp-worker-{index}"))
                .spawn(move || worker_loop(receiver, agent, body_limit))
                .map_err(|e| ClientError::Config(format!("failed to spawn transport worker: {e}")))?;
            workers.push(handle);
        }
        tracing::debug!(workers = workers.len(), "transport started");

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }
}

impl Transport for UreqTransport {
    fn submit(&self, request: HttpRequest, completion: Completion) {
        let Some(sender) = &self.sender else {
            completion.complete(TransportOutcome::failure(TransportError::Closed));
            return;
        };
        if let Err(SendError(job)) = sender.send(Job {
            request,
            completion,
        }) {
            job.completion
                .complete(TransportOutcome::failure(TransportError::Closed));
        }
    }
}

impl Drop for UreqTransport {
    fn drop(&mut self) {
        self.sender.take();
        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // A worker cannot join itself.
            if worker.thread().id() != current {
                let _ = worker.join();
            }
        }
        tracing::debug!("transport stopped");
    }
}

fn worker_loop(receiver: Receiver<Job>, agent: ureq::Agent, body_limit: u64) {
    for job in receiver.iter() {
        let outcome = catch_unwind(AssertUnwindSafe(|| execute(&agent, &job.request, body_limit)))
            .unwrap_or_else(|_| {
                tracing::error!(url = %job.request.url(), "transport worker panicked");
                TransportOutcome::failure(TransportError::Http("transport worker panicked".into()))
            });
        job.completion.complete(outcome);
    }
}

/// Perform one round-trip with `agent`, reading at most `body_limit` bytes
/// of response body.
fn execute(agent: &ureq::Agent, request: &HttpRequest, body_limit: u64) -> TransportOutcome {
    let url = request.url().as_str();
    let headers = request.headers();

    let result = match request.method() {
        HttpMethod::Get => {
            let mut builder = agent.get(url);
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        method @ (HttpMethod::Post | HttpMethod::Put) => {
            let mut builder = match method {
                HttpMethod::Put => agent.put(url),
                _ => agent.post(url),
            };
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            match request.body() {
                Some(body) => builder.send(body),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = match result {
        Ok(response) => response,
        Err(e) => return TransportOutcome::failure(map_error(e)),
    };

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let envelope = HttpResponse::new(status, headers);

    match response.body_mut().with_config().limit(body_limit).read_to_vec() {
        Ok(data) if data.is_empty() => TransportOutcome::success(envelope, None),
        Ok(data) => TransportOutcome::success(envelope, Some(data)),
        Err(e) => {
            tracing::warn!(status, url = %request.url(), error = %e, "failed to read response body");
            TransportOutcome::failure(map_error(e))
        }
    }
}

fn map_error(err: ureq::Error) -> TransportError {
    use std::io::ErrorKind;

    match &err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::HostNotFound => TransportError::Connection(err.to_string()),
        ureq::Error::Io(io) => match io.kind() {
            ErrorKind::TimedOut => TransportError::Timeout,
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionAborted
            | ErrorKind::AddrNotAvailable
            | ErrorKind::NotConnected => TransportError::Connection(err.to_string()),
            _ => TransportError::Io(err.to_string()),
        },
        _ => TransportError::Http(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::dispatch_blocking;

    #[test]
    fn zero_workers_is_rejected() {
        let config = ClientConfig::default().workers(0);
        assert!(matches!(
            UreqTransport::new(&config),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn closed_transport_completes_with_closed() {
        let mut transport = UreqTransport::new(&ClientConfig::default().workers(1)).unwrap();
        transport.sender.take();
        let url = url::Url::parse("http://127.0.0.1:9/").unwrap();
        let result = dispatch_blocking(&transport, HttpRequest::get(url));
        assert_eq!(result.error, Some(TransportError::Closed));
        assert!(result.response.is_none());
    }

    #[test]
    fn io_errors_are_classified() {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert!(matches!(
            map_error(ureq::Error::Io(refused)),
            TransportError::Connection(_)
        ));
        let reset = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        assert!(matches!(
            map_error(ureq::Error::Io(reset)),
            TransportError::Io(_)
        ));
        assert!(matches!(
            map_error(ureq::Error::HostNotFound),
            TransportError::Connection(_)
        ));
    }
}
