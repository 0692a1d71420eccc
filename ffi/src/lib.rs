//! C-ABI wrapper around `synchttp-core`.
//!
//! # Overview
//! Exposes the blocking client through `extern "C"` functions so any
//! language with a C FFI can issue GET/POST/PUT calls and receive a single
//! result struct, without linking to Rust's HTTP stack directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Parameters and extra headers cross the boundary as JSON object strings;
//!   a null pointer means "none".
//! - Every call returns an `FfiNetworkResponse`, including argument errors,
//!   which are reported with `url == NULL` because nothing was dispatched.
//! - The C caller owns all returned pointers and releases them with
//!   `synchttp_client_free` and `synchttp_free_response`.

pub mod types;

use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use synchttp_core::{ParameterMap, SyncClient};
use url::Url;

use types::*;

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

/// Borrow a C string as `&str`. `Err` if the bytes are not UTF-8.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string that outlives
/// the returned reference.
unsafe fn read_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, String> {
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| format!("{name} is not valid UTF-8"))
}

/// Parse an optional JSON object of parameters. Null means an empty map.
fn read_params(ptr: *const c_char) -> Result<ParameterMap, String> {
    if ptr.is_null() {
        return Ok(ParameterMap::new());
    }
    let json = unsafe { read_str(ptr, "params_json") }?;
    serde_json::from_str(json).map_err(|e| format!("params_json must be a JSON object: {e}"))
}

/// Parse an optional JSON object of string header values.
fn read_headers(ptr: *const c_char) -> Result<Option<Vec<(String, String)>>, String> {
    if ptr.is_null() {
        return Ok(None);
    }
    let json = unsafe { read_str(ptr, "headers_json") }?;
    let headers: BTreeMap<String, String> = serde_json::from_str(json)
        .map_err(|e| format!("headers_json must be a JSON object of strings: {e}"))?;
    Ok(Some(headers.into_iter().collect()))
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `base_url`.
///
/// Returns null if `base_url` is null, is not a usable base URL, or if an
/// internal panic occurs. The caller must free the returned pointer with
/// `synchttp_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn synchttp_client_new(base_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = (unsafe { read_str(base_url, "base_url") }) else {
            return std::ptr::null_mut();
        };
        match SyncClient::new(url) {
            Ok(client) => Box::into_raw(Box::new(FfiClient { inner: client })),
            Err(e) => {
                tracing::warn!(error = %e, "synchttp_client_new failed");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `synchttp_client_new`. Safe to call with null.
///
/// Must not be called while another thread is blocked in a call on the
/// same client.
#[unsafe(no_mangle)]
pub extern "C" fn synchttp_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Blocking calls
// ---------------------------------------------------------------------------

/// Blocking GET of `path` relative to the base URL. `params_json` may be
/// null; string values become query parameters.
#[unsafe(no_mangle)]
pub extern "C" fn synchttp_get(
    client: *const FfiClient,
    path: *const c_char,
    params_json: *const c_char,
) -> *mut FfiNetworkResponse {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiNetworkResponse::null_arg("client");
        }
        if path.is_null() {
            return FfiNetworkResponse::null_arg("path");
        }
        let client = unsafe { &*client };
        let path = match unsafe { read_str(path, "path") } {
            Ok(p) => p,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        let params = match read_params(params_json) {
            Ok(p) => p,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        FfiNetworkResponse::from_core(client.inner.get(path, &params))
    }))
    .unwrap_or_else(|_| FfiNetworkResponse::panic("panic in synchttp_get"))
}

/// Blocking GET of an absolute `url`, ignoring the base URL.
#[unsafe(no_mangle)]
pub extern "C" fn synchttp_get_url(
    client: *const FfiClient,
    url: *const c_char,
    params_json: *const c_char,
) -> *mut FfiNetworkResponse {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiNetworkResponse::null_arg("client");
        }
        if url.is_null() {
            return FfiNetworkResponse::null_arg("url");
        }
        let client = unsafe { &*client };
        let url = match unsafe { read_str(url, "url") }
            .and_then(|s| Url::parse(s).map_err(|e| format!("invalid url: {e}")))
        {
            Ok(u) => u,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        let params = match read_params(params_json) {
            Ok(p) => p,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        FfiNetworkResponse::from_core(client.inner.get_url(&url, &params))
    }))
    .unwrap_or_else(|_| FfiNetworkResponse::panic("panic in synchttp_get_url"))
}

/// Blocking POST of `params_json` as a JSON body to `path`. `headers_json`
/// may be null; otherwise it is a JSON object of header names to values,
/// applied after `Content-Type`.
#[unsafe(no_mangle)]
pub extern "C" fn synchttp_post(
    client: *const FfiClient,
    path: *const c_char,
    params_json: *const c_char,
    headers_json: *const c_char,
) -> *mut FfiNetworkResponse {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiNetworkResponse::null_arg("client");
        }
        if path.is_null() {
            return FfiNetworkResponse::null_arg("path");
        }
        let client = unsafe { &*client };
        let path = match unsafe { read_str(path, "path") } {
            Ok(p) => p,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        let params = match read_params(params_json) {
            Ok(p) => p,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        let headers = match read_headers(headers_json) {
            Ok(h) => h,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        FfiNetworkResponse::from_core(client.inner.post(path, &params, headers.as_deref()))
    }))
    .unwrap_or_else(|_| FfiNetworkResponse::panic("panic in synchttp_post"))
}

/// Blocking PUT of `params_json` as a JSON body to `path`.
#[unsafe(no_mangle)]
pub extern "C" fn synchttp_put(
    client: *const FfiClient,
    path: *const c_char,
    params_json: *const c_char,
) -> *mut FfiNetworkResponse {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiNetworkResponse::null_arg("client");
        }
        if path.is_null() {
            return FfiNetworkResponse::null_arg("path");
        }
        let client = unsafe { &*client };
        let path = match unsafe { read_str(path, "path") } {
            Ok(p) => p,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        let params = match read_params(params_json) {
            Ok(p) => p,
            Err(msg) => return FfiNetworkResponse::invalid_argument(&msg),
        };
        FfiNetworkResponse::from_core(client.inner.put(path, &params))
    }))
    .unwrap_or_else(|_| FfiNetworkResponse::panic("panic in synchttp_put"))
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free an `FfiNetworkResponse` returned by any call. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn synchttp_free_response(response: *mut FfiNetworkResponse) {
    if response.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let resp = unsafe { Box::from_raw(response) };
        free_c_string(resp.error_message);
        free_c_string(resp.url);
        if !resp.headers.is_null() && resp.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    resp.headers,
                    resp.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
        if !resp.body.is_null() {
            drop(unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(resp.body, resp.body_len))
            });
        }
    });
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
