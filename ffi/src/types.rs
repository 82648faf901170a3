//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. The host-supplied transport and
//! completion callbacks are adapted to the core's closure types here, so
//! `lib.rs` stays focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use jawbone_core::{ApiError, Completion, HttpMethod, HttpRequest, Transport};

/// Opaque handle to a `Client`. C callers receive a pointer to this and pass
/// it back into every FFI function.
pub struct FfiJawboneClient {
    pub(crate) inner: jawbone_core::Client,
}

/// Opaque one-shot completion handed to the host transport. Resolve it with
/// `jawbone_complete` exactly once.
pub struct FfiCompletion {
    pub(crate) done: Completion,
}

/// Host pointer passed back verbatim to host callbacks. The host is
/// responsible for it being usable from whichever thread completes a call.
#[derive(Clone, Copy)]
pub(crate) struct UserData(pub(crate) *mut c_void);

unsafe impl Send for UserData {}
unsafe impl Sync for UserData {}

impl UserData {
    pub(crate) fn ptr(self) -> *mut c_void {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Handed to the host transport, which owns it and releases it with
/// `jawbone_free_request`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_raw_c(k),
                    value: into_raw_c(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: into_raw_c(req.url),
            headers,
            headers_len,
            body: req.body.map(into_raw_c).unwrap_or(std::ptr::null_mut()),
        }))
    }

    /// Release a request built by [`FfiHttpRequest::from_core`]. `req` must
    /// be null or a pointer from `from_core` that has not been freed yet.
    pub(crate) fn free(req: *mut Self) {
        if req.is_null() {
            return;
        }
        let req = unsafe { Box::from_raw(req) };
        free_c(req.url);
        free_c(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c(h.key);
                free_c(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Results and callbacks
// ---------------------------------------------------------------------------

/// Outcome category passed to completion callbacks.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    BadParameters = 1,
    MissingIdentifier = 2,
    MissingConfiguration = 3,
    Unsupported = 4,
    Transport = 5,
    Panic = 6,
    NullArg = 7,
}

impl From<&ApiError> for FfiErrorCode {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::BadParameters => FfiErrorCode::BadParameters,
            ApiError::MissingIdentifier => FfiErrorCode::MissingIdentifier,
            ApiError::MissingConfiguration(_) => FfiErrorCode::MissingConfiguration,
            ApiError::Unsupported { .. } => FfiErrorCode::Unsupported,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        }
    }
}

/// Completion callback. On success `code` is `Ok`, `message` is null and
/// `body` holds the raw response body; on failure `body` is null. Both
/// strings are only valid for the duration of the call.
pub type FfiCallback = extern "C" fn(
    user_data: *mut c_void,
    code: FfiErrorCode,
    message: *const c_char,
    body: *const c_char,
);

/// Host transport. Must eventually call `jawbone_complete(completion, ...)`
/// exactly once and free `request` with `jawbone_free_request`.
pub type FfiTransportFn = extern "C" fn(
    user_data: *mut c_void,
    request: *mut FfiHttpRequest,
    completion: *mut FfiCompletion,
);

/// Core `Transport` backed by a host function pointer.
pub(crate) struct HostTransport {
    pub(crate) func: FfiTransportFn,
    pub(crate) user_data: UserData,
}

impl Transport for HostTransport {
    fn execute(&self, request: HttpRequest, done: Completion) {
        let request = FfiHttpRequest::from_core(request);
        let completion = Box::into_raw(Box::new(FfiCompletion { done }));
        (self.func)(self.user_data.ptr(), request, completion);
    }
}

/// Adapt a C callback to the core's completion closure.
pub(crate) fn deliver(
    callback: FfiCallback,
    user_data: UserData,
) -> impl FnOnce(Result<String, ApiError>) + Send + 'static {
    move |result| match result {
        Ok(body) => {
            let body = c_string(body);
            callback(user_data.ptr(), FfiErrorCode::Ok, std::ptr::null(), body.as_ptr());
        }
        Err(err) => report(callback, user_data, FfiErrorCode::from(&err), &err.to_string()),
    }
}

/// Invoke a C callback with an error and no body.
pub(crate) fn report(callback: FfiCallback, user_data: UserData, code: FfiErrorCode, message: &str) {
    let message = c_string(message.to_string());
    callback(user_data.ptr(), code, message.as_ptr(), std::ptr::null());
}

/// Build a `CString`, dropping interior NULs rather than failing.
pub(crate) fn c_string(s: String) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

fn into_raw_c(s: String) -> *mut c_char {
    c_string(s).into_raw()
}

fn free_c(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
