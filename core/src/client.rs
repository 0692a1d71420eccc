//! Blocking HTTP client bound to a base URL.
//!
//! # Design
//! `SyncClient` owns its base URL, default headers and transport, and keeps
//! no per-call state. Each method builds a fresh `HttpRequest`, dispatches it
//! through `dispatch_blocking` and returns the `NetworkResponse`. The
//! transport is a type parameter so tests can inject a fake; the default is
//! `UreqTransport`.

use url::Url;

use crate::bridge::{dispatch_blocking, Transport};
use crate::builder::{build_get, build_json_body, merge_headers, resolve_url};
use crate::config::ClientConfig;
use crate::encode::ParameterMap;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};
use crate::response::NetworkResponse;
use crate::transport::UreqTransport;

/// Synchronous client: every call blocks until the transport reports an
/// outcome.
pub struct SyncClient<T: Transport = UreqTransport> {
    base_url: Url,
    default_headers: Vec<(String, String)>,
    transport: T,
}

impl SyncClient<UreqTransport> {
    /// Client for `base_url` with the default configuration.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::default().base_url(base_url))
    }

    /// Client built from `config`. `config.base_url` is required.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let base = config
            .base_url
            .as_deref()
            .ok_or_else(|| ClientError::Config("base_url is not set".into()))?;
        let base_url = parse_base_url(base)?;
        let transport = UreqTransport::new(&config)?;
        Ok(Self {
            base_url,
            default_headers: config.default_headers,
            transport,
        })
    }
}

impl<T: Transport> SyncClient<T> {
    /// Client for `base_url` that dispatches through `transport`.
    pub fn with_transport(base_url: &str, transport: T) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            default_headers: Vec::new(),
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `path` relative to the base URL, with `params` in the query.
    pub fn get(&self, path: &str, params: &ParameterMap) -> NetworkResponse {
        let url = resolve_url(&self.base_url, path);
        self.perform(build_get(&url, params))
    }

    /// GET an absolute `url`, ignoring the base URL.
    pub fn get_url(&self, url: &Url, params: &ParameterMap) -> NetworkResponse {
        self.perform(build_get(url, params))
    }

    /// POST `params` as JSON to `path`. `headers` are applied last and may
    /// override `Content-Type`.
    pub fn post(
        &self,
        path: &str,
        params: &ParameterMap,
        headers: Option<&[(String, String)]>,
    ) -> NetworkResponse {
        let url = resolve_url(&self.base_url, path);
        let mut request = build_json_body(&url, HttpMethod::Post, params);
        if let Some(headers) = headers {
            request = merge_headers(request, headers.iter().cloned());
        }
        self.perform(request)
    }

    /// PUT `params` as JSON to `path`.
    pub fn put(&self, path: &str, params: &ParameterMap) -> NetworkResponse {
        let url = resolve_url(&self.base_url, path);
        self.perform(build_json_body(&url, HttpMethod::Put, params))
    }

    fn perform(&self, request: HttpRequest) -> NetworkResponse {
        let request = with_defaults(request, &self.default_headers);
        dispatch_blocking(&self.transport, request)
    }
}

/// Apply `defaults` underneath the headers the request already has.
fn with_defaults(request: HttpRequest, defaults: &[(String, String)]) -> HttpRequest {
    if defaults.is_empty() {
        return request;
    }
    let missing: Vec<(String, String)> = defaults
        .iter()
        .filter(|(name, _)| request.header(name).is_none())
        .cloned()
        .collect();
    merge_headers(request, missing)
}

fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let url = Url::parse(base_url).map_err(|source| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        source,
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientError::CannotBeABase(base_url.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::bridge::{Completion, TransportOutcome};
    use crate::http::HttpResponse;

    type Recorded = Arc<Mutex<Vec<HttpRequest>>>;

    /// Transport that records requests and answers 200 with the request URL.
    fn recording() -> (impl Transport, Recorded) {
        let recorded: Recorded = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&recorded);
        let transport = move |req: HttpRequest, done: Completion| {
            let body = req.url().as_str().as_bytes().to_vec();
            sink.lock().push(req);
            done.complete(TransportOutcome::success(
                HttpResponse::new(200, Vec::new()),
                Some(body),
            ));
        };
        (transport, recorded)
    }

    fn client() -> (SyncClient<impl Transport>, Recorded) {
        let (transport, recorded) = recording();
        let client = SyncClient::with_transport("http://localhost:3000/api", transport).unwrap();
        (client, recorded)
    }

    #[test]
    fn get_resolves_path_and_encodes_query() {
        let (client, recorded) = client();
        let params = ParameterMap::from([("q".to_string(), json!("a b"))]);
        let result = client.get("search", &params);

        assert!(result.is_success());
        assert_eq!(
            result.text().unwrap(),
            "http://localhost:3000/api/search?q=a%20b"
        );
        let sent = recorded.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method(), HttpMethod::Get);
        assert_eq!(result.request.as_ref(), Some(&sent[0]));
    }

    #[test]
    fn get_url_ignores_base() {
        let (client, _) = client();
        let url = Url::parse("https://other.example/x?a=1").unwrap();
        let params = ParameterMap::from([("b".to_string(), json!("2"))]);
        let result = client.get_url(&url, &params);
        assert_eq!(result.text().unwrap(), "https://other.example/x?a=1&b=2");
    }

    #[test]
    fn post_merges_extra_headers() {
        let (client, recorded) = client();
        let params = ParameterMap::from([("title".to_string(), json!("Buy milk"))]);
        let headers = vec![("Authorization".to_string(), "Bearer t".to_string())];
        client.post("items", &params, Some(headers.as_slice()));

        let sent = recorded.lock();
        assert_eq!(sent[0].method(), HttpMethod::Post);
        assert_eq!(sent[0].url().as_str(), "http://localhost:3000/api/items");
        assert_eq!(
            sent[0].header("Content-Type"),
            Some("application/json; charset=utf-8")
        );
        assert_eq!(sent[0].header("authorization"), Some("Bearer t"));
        let body: serde_json::Value = serde_json::from_slice(sent[0].body().unwrap()).unwrap();
        assert_eq!(body, json!({"title": "Buy milk"}));
    }

    #[test]
    fn post_without_headers() {
        let (client, recorded) = client();
        client.post("items", &ParameterMap::new(), None);
        assert_eq!(recorded.lock()[0].headers().len(), 1);
    }

    #[test]
    fn put_sends_json_body() {
        let (client, recorded) = client();
        let params = ParameterMap::from([("done".to_string(), json!(true))]);
        client.put("items/1", &params);

        let sent = recorded.lock();
        assert_eq!(sent[0].method(), HttpMethod::Put);
        assert_eq!(sent[0].url().as_str(), "http://localhost:3000/api/items/1");
        assert_eq!(sent[0].body(), Some(&br#"{"done":true}"#[..]));
    }

    #[test]
    fn http_error_status_is_not_an_error() {
        let transport = |_req: HttpRequest, done: Completion| {
            done.complete(TransportOutcome::success(
                HttpResponse::new(500, Vec::new()),
                Some(b"boom".to_vec()),
            ));
        };
        let client = SyncClient::with_transport("http://localhost", transport).unwrap();
        let result = client.get("x", &ParameterMap::new());
        assert_eq!(result.status(), Some(500));
        assert!(result.error.is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn default_headers_do_not_override_explicit_ones() {
        let request =
            HttpRequest::get(Url::parse("http://x").unwrap()).with_header("Accept", "text/plain");
        let defaults = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("X-Trace".to_string(), "1".to_string()),
        ];
        let merged = with_defaults(request, &defaults);
        assert_eq!(merged.header("Accept"), Some("text/plain"));
        assert_eq!(merged.header("X-Trace"), Some("1"));
    }

    #[test]
    fn invalid_base_urls_fail_fast() {
        let noop = |_req: HttpRequest, _done: Completion| {};
        assert!(matches!(
            SyncClient::with_transport("not a url", noop),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            SyncClient::with_transport("mailto:someone@example.com", noop),
            Err(ClientError::CannotBeABase(_))
        ));
    }

    #[test]
    fn from_config_requires_base_url() {
        assert!(matches!(
            SyncClient::from_config(ClientConfig::default()),
            Err(ClientError::Config(_))
        ));
    }
}
