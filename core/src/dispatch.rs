//! GET / POST-form / DELETE dispatch over an injected [`Transport`].
//!
//! # Design
//! Building and sending are separate steps. `build_*` methods produce an
//! [`HttpRequest`] with the auth headers already attached, so the bearer
//! value is fixed at build time; `send` hands it to the transport and maps
//! the response down to its raw body for the caller.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::query::form_encode;

/// Completion callback handed to facade calls: the raw body or an error.
pub type Callback = Box<dyn FnOnce(Result<String, ApiError>) + Send + 'static>;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Clone)]
pub struct Dispatcher {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/moves/123`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn build_get(&self, path: &str, bearer: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path),
            headers: auth_headers(bearer),
            body: None,
        }
    }

    pub fn build_post(&self, path: &str, form: &Map<String, Value>, bearer: &str) -> HttpRequest {
        let mut headers = auth_headers(bearer);
        headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
        HttpRequest {
            method: HttpMethod::Post,
            url: self.url(path),
            headers,
            body: Some(form_encode(form)),
        }
    }

    pub fn build_delete(&self, path: &str, bearer: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.url(path),
            headers: auth_headers(bearer),
            body: None,
        }
    }

    /// Issue exactly one transport call and forward its outcome.
    ///
    /// The response body is passed on whatever the status code.
    pub fn send(&self, request: HttpRequest, callback: Callback) {
        debug!(method = %request.method, url = %request.url, "dispatching request");
        let method = request.method;
        let url = request.url.clone();
        self.transport.execute(
            request,
            Box::new(move |result| match result {
                Ok(response) => {
                    debug!(%method, %url, status = response.status, "request completed");
                    callback(Ok(response.body));
                }
                Err(err) => {
                    warn!(%method, %url, error = %err, "transport failed");
                    callback(Err(err));
                }
            }),
        );
    }
}

fn auth_headers(bearer: &str) -> Vec<(String, String)> {
    vec![
        ("Authorization".to_string(), bearer.to_string()),
        ("Accept".to_string(), "application/json".to_string()),
    ]
}
