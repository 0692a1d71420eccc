//! Client configuration.
//!
//! # Design
//! `ClientConfig` is plain data with builder-style setters. `from_env` reads
//! the same fields from `SYNCHTTP_*` environment variables; none of them are
//! required. The timeout here belongs to the transport: the blocking bridge
//! itself never gives up on a request.

use std::time::Duration;

use crate::error::ClientError;

const ENV_BASE_URL: &str = "SYNCHTTP_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "SYNCHTTP_TIMEOUT_SECS";
const ENV_WORKERS: &str = "SYNCHTTP_WORKERS";
const ENV_USER_AGENT: &str = "SYNCHTTP_USER_AGENT";
const ENV_BODY_LIMIT: &str = "SYNCHTTP_BODY_LIMIT";

/// Settings for `SyncClient` and `UreqTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Root URL that relative paths are resolved against.
    pub base_url: Option<String>,
    /// Whole-request timeout enforced by the transport. `None` disables it.
    pub timeout: Option<Duration>,
    /// Number of transport worker threads.
    pub workers: usize,
    /// `User-Agent` sent when a request does not set one.
    pub user_agent: String,
    /// Headers added to every request before per-call headers.
    pub default_headers: Vec<(String, String)>,
    /// Largest response body the transport will read, in bytes. `None`
    /// reads bodies of any size.
    pub body_limit: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(Duration::from_secs(30)),
            workers: 4,
            user_agent: format!("synchttp/{}", env!("CARGO_PKG_VERSION")),
            default_headers: Vec::new(),
            body_limit: None,
        }
    }
}

impl ClientConfig {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn body_limit(mut self, bytes: u64) -> Self {
        self.body_limit = Some(bytes);
        self
    }

    /// Defaults overridden by any `SYNCHTTP_*` variables that are set.
    ///
    /// `SYNCHTTP_TIMEOUT_SECS=0` disables the transport timeout and
    /// `SYNCHTTP_BODY_LIMIT=0` lifts the body limit.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = Some(url);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("{ENV_TIMEOUT_SECS}: {e}")))?;
            config.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(workers) = lookup(ENV_WORKERS) {
            config.workers = workers
                .trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("{ENV_WORKERS}: {e}")))?;
        }
        if let Some(limit) = lookup(ENV_BODY_LIMIT) {
            let limit: u64 = limit
                .trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("{ENV_BODY_LIMIT}: {e}")))?;
            config.body_limit = (limit > 0).then_some(limit);
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            config.user_agent = user_agent;
        }
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn validate(&self) -> Result<(), ClientError> {
        if self.workers == 0 {
            return Err(ClientError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_none());
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.workers, 4);
        assert!(config.user_agent.starts_with("synchttp/"));
        assert!(config.body_limit.is_none());
    }

    #[test]
    fn builder_setters() {
        let config = ClientConfig::default()
            .base_url("http://localhost:3000")
            .no_timeout()
            .workers(2)
            .user_agent("test")
            .default_header("Accept", "application/json");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert!(config.timeout.is_none());
        assert_eq!(config.workers, 2);
        assert_eq!(config.user_agent, "test");
        assert_eq!(config.default_headers.len(), 1);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn environment_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SYNCHTTP_BASE_URL", "http://api.local"),
            ("SYNCHTTP_TIMEOUT_SECS", "5"),
            ("SYNCHTTP_WORKERS", "8"),
            ("SYNCHTTP_USER_AGENT", "agent/1"),
            ("SYNCHTTP_BODY_LIMIT", "1048576"),
        ]))
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://api.local"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.workers, 8);
        assert_eq!(config.user_agent, "agent/1");
        assert_eq!(config.body_limit, Some(1_048_576));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let config = ClientConfig::from_lookup(lookup(&[("SYNCHTTP_TIMEOUT_SECS", "0")])).unwrap();
        assert!(config.timeout.is_none());
    }

    #[test]
    fn zero_body_limit_lifts_it() {
        let config = ClientConfig::from_lookup(lookup(&[("SYNCHTTP_BODY_LIMIT", "0")])).unwrap();
        assert!(config.body_limit.is_none());
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("SYNCHTTP_WORKERS", "many")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        let err = ClientConfig::from_lookup(lookup(&[("SYNCHTTP_WORKERS", "0")])).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
