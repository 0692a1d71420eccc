//! Verify the encoder and URL builder against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Vector files are shared with other bindings of the client, so every case
//! names the exact string a conforming implementation must produce.

use synchttp_core::builder::{append_query, build_get, resolve_url};
use synchttp_core::encode::encode_query;
use synchttp_core::{HttpMethod, ParameterMap};
use url::Url;

// ---------------------------------------------------------------------------
// Query encoding
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let params: ParameterMap = serde_json::from_value(case["params"].clone()).unwrap();
        let expected = case["expected_query"].as_str().unwrap();

        assert_eq!(encode_query(&params), expected, "{name}: query");
        // Encoding is deterministic.
        assert_eq!(encode_query(&params), encode_query(&params.clone()), "{name}: stable");
    }
}

#[test]
fn query_vectors_build_valid_get_requests() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let base = Url::parse("http://localhost:3000/search").unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let params: ParameterMap = serde_json::from_value(case["params"].clone()).unwrap();
        let expected = case["expected_query"].as_str().unwrap();

        let req = build_get(&base, &params);
        assert_eq!(req.method(), HttpMethod::Get, "{name}: method");
        assert!(req.body().is_none(), "{name}: body should be None");
        assert_eq!(req.url().query(), Some(expected), "{name}: url query");
    }
}

// ---------------------------------------------------------------------------
// URL composition
// ---------------------------------------------------------------------------

#[test]
fn resolve_test_vectors() {
    let raw = include_str!("../../test-vectors/urls.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["resolve"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let base = Url::parse(case["base"].as_str().unwrap()).unwrap();
        let path = case["path"].as_str().unwrap();

        let resolved = resolve_url(&base, path);
        assert_eq!(resolved.as_str(), case["expected"].as_str().unwrap(), "{name}");
    }
}

#[test]
fn append_test_vectors() {
    let raw = include_str!("../../test-vectors/urls.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["append"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let url = Url::parse(case["url"].as_str().unwrap()).unwrap();
        let query = case["query"].as_str().unwrap();

        let appended = append_query(&url, query);
        assert_eq!(appended.as_str(), case["expected"].as_str().unwrap(), "{name}");
    }
}
