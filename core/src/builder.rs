//! Request construction: URL resolution, query composition and body
//! encoding.
//!
//! # Design
//! Every function here is pure and infallible. URL composition that would
//! produce an unparsable URL falls back to the input URL rather than failing,
//! so request construction never aborts a call.

use url::{Position, Url};

use crate::encode::{encode_body, encode_query, ParameterMap};
use crate::http::{HttpMethod, HttpRequest};

/// Append `path` to `base` as path components.
///
/// `base` is treated as a directory: `http://host/api` and `http://host/api/`
/// both resolve `users/1` to `http://host/api/users/1`. Empty segments in
/// `path` are ignored, a trailing `/` on `path` is kept, and an empty `path`
/// returns `base` unchanged. Each segment is percent-encoded, so `?` or `#`
/// inside `path` never start a query or fragment.
pub fn resolve_url(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let mut parts = path.split('/').filter(|s| !s.is_empty()).peekable();
    if parts.peek().is_none() {
        return url;
    }
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty().extend(parts);
            if path.ends_with('/') {
                segments.push("");
            }
        }
        Err(()) => {
            tracing::warn!(base = %base, "base URL cannot carry a path, ignoring `{path}`");
        }
    };
    url
}

/// Append an already-encoded `query` to `url`, after any existing query and
/// before any fragment: `&query` if `url` has a query, `?query` otherwise.
/// An empty `query` still adds the separator. Returns `url` unchanged when
/// the composed string fails to parse.
pub fn append_query(url: &Url, query: &str) -> Url {
    let separator = if url.query().is_some() { '&' } else { '?' };
    let composed = format!(
        "{}{separator}{query}{}",
        &url[..Position::AfterQuery],
        &url[Position::AfterQuery..]
    );
    match Url::parse(&composed) {
        Ok(url) => url,
        // The query parser escapes bytes it does not accept instead of
        // rejecting them, so only a malformed prefix can land here.
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "composed query URL did not parse, using original");
            url.clone()
        }
    }
}

/// A GET for `url` with `params` encoded into its query string.
pub fn build_get(url: &Url, params: &ParameterMap) -> HttpRequest {
    HttpRequest::get(append_query(url, &encode_query(params)))
}

/// A request carrying `params` as a JSON body, for `HttpMethod::Post` or
/// `HttpMethod::Put`. The body is absent if serialization failed.
pub fn build_json_body(url: &Url, method: HttpMethod, params: &ParameterMap) -> HttpRequest {
    let (body, content_type) = encode_body(params);
    HttpRequest::with_body(method, url.clone(), body).with_header("Content-Type", content_type)
}

/// Overlay `headers` onto `request`. A header that is already present
/// (compared ignoring ASCII case) is overwritten.
pub fn merge_headers<I, K, V>(request: HttpRequest, headers: I) -> HttpRequest
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    headers
        .into_iter()
        .fold(request, |req, (k, v)| req.with_header(k.as_ref(), v.as_ref()))
}
