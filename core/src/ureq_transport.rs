//! Blocking `ureq` transport run off the caller's thread.
//!
//! Each request gets its own thread so `execute` returns immediately and the
//! completion fires later from that thread. HTTP error statuses are returned
//! as data: the nudge API reports failures in the body, and the core passes
//! bodies through untouched. Bodies that are not UTF-8 (the `image`
//! sub-resources return PNG) are decoded lossily rather than failing.

use tracing::trace;

use crate::error::ApiError;
use crate::http::{Completion, HttpMethod, HttpRequest, HttpResponse, Transport};

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest, done: Completion) {
        let agent = self.agent.clone();
        std::thread::spawn(move || done(send(&agent, request)));
    }
}

/// Perform one blocking round-trip.
pub fn send(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    trace!(method = %req.method, url = %req.url, "ureq round-trip");
    let result = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            builder.call()
        }
        HttpMethod::Delete => {
            let mut builder = agent.delete(&req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            builder.call()
        }
        HttpMethod::Post => {
            let mut builder = agent.post(&req.url);
            for (k, v) in &req.headers {
                builder = builder.header(k.as_str(), v.as_str());
            }
            match req.body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    };

    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                v.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();
    let bytes = response
        .body_mut()
        .read_to_vec()
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
