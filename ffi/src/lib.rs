//! C-ABI wrapper around `jawbone-core`.
//!
//! # Overview
//! Exposes the nudge API client through `extern "C"` functions. The host
//! language performs the HTTP I/O: it supplies a transport function at client
//! creation, receives each request as an `FfiHttpRequest`, and resolves the
//! matching `FfiCompletion` with `jawbone_complete`. Results reach the host
//! through an `FfiCallback`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Closures passed to `catch_unwind` capture raw pointers and dereference
//!   them inside; no lock is held across a host callback.
//! - A null transport selects the simulated transport, which completes every
//!   call with its URL.
//! - Options travel as JSON text; text that does not parse is treated as a
//!   non-mapping and reported as bad parameters.
//! - The build script writes the C header to `$OUT_DIR/jawbone.h` and
//!   exports its path as `JAWBONE_HEADER`.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use jawbone_core::{ApiError, Callback, Client, Config, HttpResponse, Operation, Resource};
use serde_json::Value;
use tracing::warn;

use types::*;

static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");

/// Borrow a C string as UTF-8. Null or invalid UTF-8 yields `None`.
fn read_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client from a JSON config (`client_id`, `client_secret`,
/// `access_token`, `base_url`; all optional).
///
/// `config_json` may be null for defaults. `transport` may be null to use the
/// simulated transport. Returns null if the config is not valid JSON or an
/// internal panic occurs. Free with `jawbone_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_client_new(
    config_json: *const c_char,
    transport: Option<FfiTransportFn>,
    transport_user_data: *mut c_void,
) -> *mut FfiJawboneClient {
    catch_unwind(AssertUnwindSafe(|| {
        let config = if config_json.is_null() {
            Config::default()
        } else {
            let raw = read_str(config_json).unwrap_or("");
            match serde_json::from_str::<Value>(raw) {
                Ok(value) => Config::from_value(&value),
                Err(e) => {
                    warn!(error = %e, "rejecting client config");
                    return std::ptr::null_mut();
                }
            }
        };
        let client = match transport {
            Some(func) => Client::with_transport(
                &config,
                HostTransport {
                    func,
                    user_data: UserData(transport_user_data),
                },
            ),
            None => Client::simulated(&config),
        };
        Box::into_raw(Box::new(FfiJawboneClient { inner: client }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `jawbone_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_client_free(client: *mut FfiJawboneClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Which credential slot a setter writes.
#[derive(Clone, Copy)]
enum Slot {
    ClientId,
    ClientSecret,
    AccessToken,
}

fn set_credential(client: *const FfiJawboneClient, value: *const c_char, slot: Slot) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return false;
        }
        let Some(value) = read_str(value) else {
            return false;
        };
        let client = unsafe { &*client };
        match slot {
            Slot::ClientId => client.inner.set_client_id(value),
            Slot::ClientSecret => client.inner.set_client_secret(value),
            Slot::AccessToken => client.inner.set_access_token(value),
        }
        true
    }))
    .unwrap_or(false)
}

/// Replace the access token used for later calls. A null or non-UTF-8
/// `token` leaves the current value in place and returns false.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_set_access_token(
    client: *const FfiJawboneClient,
    token: *const c_char,
) -> bool {
    set_credential(client, token, Slot::AccessToken)
}

/// Replace the client secret. Same rules as `jawbone_set_access_token`.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_set_client_secret(
    client: *const FfiJawboneClient,
    secret: *const c_char,
) -> bool {
    set_credential(client, secret, Slot::ClientSecret)
}

/// Replace the client id. Same rules as `jawbone_set_access_token`.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_set_client_id(client: *const FfiJawboneClient, id: *const c_char) -> bool {
    set_credential(client, id, Slot::ClientId)
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Run `operation` (`get`, `create`, `update`, `delete`, `image`,
/// `snapshot`, `ticks`) on `resource` (`moves`, `events.body`, ...).
///
/// `options_json` may be null for `{}`. Returns false only when `callback`
/// is null, in which case nothing is done; otherwise `callback` fires exactly
/// once, possibly before this function returns.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_call(
    client: *const FfiJawboneClient,
    resource: *const c_char,
    operation: *const c_char,
    options_json: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> bool {
    let Some(callback) = callback else {
        return false;
    };
    let user_data = UserData(user_data);
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return report(callback, user_data, FfiErrorCode::NullArg, "null argument: client");
        }
        let (Some(resource_name), Some(operation_name)) = (read_str(resource), read_str(operation))
        else {
            return report(
                callback,
                user_data,
                FfiErrorCode::NullArg,
                "null argument: resource or operation",
            );
        };
        let Some(resource) = Resource::from_name(resource_name) else {
            return report(
                callback,
                user_data,
                FfiErrorCode::Unsupported,
                &format!("Unknown resource: {resource_name}"),
            );
        };
        let Some(op) = Operation::from_name(operation_name) else {
            return report(
                callback,
                user_data,
                FfiErrorCode::Unsupported,
                &format!("Unknown operation: {operation_name}"),
            );
        };
        let options = if options_json.is_null() {
            Value::Object(Default::default())
        } else {
            read_str(options_json)
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or(Value::Null)
        };
        let client = unsafe { &*client };
        client
            .inner
            .call(resource, op, &options, deliver(callback, user_data));
    }));
    if outcome.is_err() {
        report(callback, user_data, FfiErrorCode::Panic, "panic in jawbone_call");
    }
    true
}

/// Request a refreshed token using the configured client secret.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_refresh_token(
    client: *const FfiJawboneClient,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> bool {
    with_client(client, callback, user_data, "jawbone_refresh_token", |client, done| {
        client.refresh_token().get(done)
    })
}

/// Register `url` as the pub/sub webhook. A null or empty `url` is reported
/// as missing configuration.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_webhook_create(
    client: *const FfiJawboneClient,
    url: *const c_char,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> bool {
    with_client(client, callback, user_data, "jawbone_webhook_create", |client, done| {
        client.webhook().create(read_str(url), done)
    })
}

/// Remove the pub/sub webhook.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_webhook_delete(
    client: *const FfiJawboneClient,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
) -> bool {
    with_client(client, callback, user_data, "jawbone_webhook_delete", |client, done| {
        client.webhook().delete(done)
    })
}

/// Shared null checks and panic guard for the fixed-shape calls.
fn with_client<G>(
    client: *const FfiJawboneClient,
    callback: Option<FfiCallback>,
    user_data: *mut c_void,
    name: &str,
    run: G,
) -> bool
where
    G: FnOnce(&Client, Callback),
{
    let Some(callback) = callback else {
        return false;
    };
    let user_data = UserData(user_data);
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return report(callback, user_data, FfiErrorCode::NullArg, "null argument: client");
        }
        let client = unsafe { &*client };
        run(&client.inner, Box::new(deliver(callback, user_data)));
    }));
    if outcome.is_err() {
        report(callback, user_data, FfiErrorCode::Panic, &format!("panic in {name}"));
    }
    true
}

// ---------------------------------------------------------------------------
// Host transport completion
// ---------------------------------------------------------------------------

/// Resolve a completion handed to the host transport.
///
/// A non-null `error` reports a transport failure and `status`/`body` are
/// ignored; otherwise `body` (null meaning empty) is delivered as the
/// response. Consumes `completion`. Returns false if `completion` is null.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_complete(
    completion: *mut FfiCompletion,
    status: u16,
    body: *const c_char,
    error: *const c_char,
) -> bool {
    if completion.is_null() {
        return false;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let completion = unsafe { Box::from_raw(completion) };
        let result = if error.is_null() {
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: read_str(body).unwrap_or_default().to_string(),
            })
        } else {
            Err(ApiError::Transport(read_str(error).unwrap_or_default().to_string()))
        };
        (completion.done)(result);
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` handed to the host transport. Safe to call with
/// null.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| FfiHttpRequest::free(req));
}

/// Library version as a static NUL-terminated string. Do not free.
#[unsafe(no_mangle)]
pub extern "C" fn jawbone_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
