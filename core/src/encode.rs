//! Query-string and JSON body encoding for parameter maps.
//!
//! Both encoders are lenient: a value that cannot be encoded is dropped and
//! logged, never reported as an error.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Request parameters keyed by name. A `BTreeMap` keeps encoded output
/// sorted by key, so the same input always produces the same string.
pub type ParameterMap = BTreeMap<String, Value>;

/// `Content-Type` sent with every JSON body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Bytes left unescaped inside a query component: the URL query-allowed set
/// minus `&`, which separates pairs and must always be escaped in a value.
/// `+` stays literal; spaces become `%20`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'$')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b'-')
    .remove(b'.')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'@')
    .remove(b'_')
    .remove(b'~');

/// Encode the string-valued entries of `params` as `key=value` pairs joined
/// by `&`. Entries with non-string values are skipped.
pub fn encode_query(params: &ParameterMap) -> String {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        let Value::String(value) = value else {
            tracing::debug!(key = %key, "skipping non-string query parameter");
            continue;
        };
        pairs.push(format!(
            "{}={}",
            utf8_percent_encode(key, QUERY_COMPONENT),
            utf8_percent_encode(value, QUERY_COMPONENT)
        ));
    }
    pairs.join("&")
}

/// Serialize `params` as a JSON object. Returns the body (or `None` if
/// serialization failed) together with the matching `Content-Type`.
pub fn encode_body(params: &ParameterMap) -> (Option<Vec<u8>>, &'static str) {
    let body = match serde_json::to_vec(params) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize JSON body, sending none");
            None
        }
    };
    (body, JSON_CONTENT_TYPE)
}
