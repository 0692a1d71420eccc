//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! `FfiNetworkResponse` mirrors `NetworkResponse` with C-compatible fields:
//! `*mut c_char` instead of `String`, pointer + length pairs instead of `Vec`,
//! and an explicit error code instead of `Option<TransportError>`. Buffers are
//! allocated as boxed slices so length and capacity always agree when they
//! are released in `synchttp_free_response`.

use std::ffi::CString;
use std::os::raw::c_char;

use synchttp_core::{HttpMethod, NetworkResponse, TransportError};

/// Opaque handle to a `SyncClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: synchttp_core::SyncClient,
}

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// Error codes returned in `FfiNetworkResponse`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Timeout = 1,
    Connection = 2,
    Io = 3,
    Http = 4,
    Closed = 5,
    InvalidArgument = 6,
    Panic = 7,
    NullArg = 8,
}

impl From<&TransportError> for FfiErrorCode {
    fn from(err: &TransportError) -> Self {
        match err {
            TransportError::Timeout => FfiErrorCode::Timeout,
            TransportError::Connection(_) => FfiErrorCode::Connection,
            TransportError::Io(_) => FfiErrorCode::Io,
            TransportError::Http(_) => FfiErrorCode::Http,
            TransportError::Closed => FfiErrorCode::Closed,
        }
    }
}

/// Outcome of one blocking call, exposed to C.
///
/// `status` is 0 when no response arrived. `url` is null when the request
/// was never dispatched (bad arguments). `body` is null when there is no body;
/// it is not NUL-terminated, use `body_len`. On failure `error_code`
/// describes the category and `error_message` is a human-readable C string.
#[repr(C)]
pub struct FfiNetworkResponse {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub status: u16,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut u8,
    pub body_len: usize,
}

/// Allocate a C string, dropping the value to empty if it holds a NUL byte.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

impl FfiNetworkResponse {
    fn empty(error_code: FfiErrorCode, error_message: *mut c_char) -> Self {
        FfiNetworkResponse {
            error_code,
            error_message,
            method: FfiHttpMethod::Get,
            url: std::ptr::null_mut(),
            status: 0,
            headers: std::ptr::null_mut(),
            headers_len: 0,
            body: std::ptr::null_mut(),
            body_len: 0,
        }
    }

    /// Convert a core `NetworkResponse` into a heap-allocated `FfiNetworkResponse`.
    pub(crate) fn from_core(resp: NetworkResponse) -> *mut Self {
        let (error_code, error_message) = match &resp.error {
            Some(err) => (FfiErrorCode::from(err), c_string(err.to_string())),
            None => (FfiErrorCode::Ok, std::ptr::null_mut()),
        };
        let mut out = Self::empty(error_code, error_message);

        if let Some(request) = &resp.request {
            out.method = request.method().into();
            out.url = c_string(request.url().as_str());
        }

        if let Some(response) = resp.response {
            out.status = response.status;
            if !response.headers.is_empty() {
                let headers: Box<[FfiHeader]> = response
                    .headers
                    .into_iter()
                    .map(|(k, v)| FfiHeader {
                        key: c_string(k),
                        value: c_string(v),
                    })
                    .collect();
                out.headers_len = headers.len() as u32;
                out.headers = Box::into_raw(headers) as *mut FfiHeader;
            }
        }

        if let Some(data) = resp.data {
            let data = data.into_boxed_slice();
            out.body_len = data.len();
            out.body = Box::into_raw(data) as *mut u8;
        }

        Box::into_raw(Box::new(out))
    }

    /// Build a result for arguments that could not be turned into a request.
    pub(crate) fn invalid_argument(msg: &str) -> *mut Self {
        Box::into_raw(Box::new(Self::empty(
            FfiErrorCode::InvalidArgument,
            c_string(msg),
        )))
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        let msg = format!("null argument: {name}");
        Box::into_raw(Box::new(Self::empty(FfiErrorCode::NullArg, c_string(msg))))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Box::into_raw(Box::new(Self::empty(FfiErrorCode::Panic, c_string(msg))))
    }
}
