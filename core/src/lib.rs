//! Client binding for the Jawbone UP nudge REST API.
//!
//! # Overview
//! Builds request URLs from a static endpoint catalog, attaches bearer-token
//! authentication, and forwards GET / POST / DELETE calls through an injected
//! [`Transport`]. Response bodies are handed back verbatim through a
//! completion callback; nothing is parsed, retried, or cached.
//!
//! # Design
//! - `Client` holds the credentials and exposes the catalog as resource
//!   handles (`client.moves().get(...)`, `client.events().body().delete(...)`).
//! - Request building is pure (`Client::build_request`); sending goes through
//!   whatever `Transport` the client was created with, so tests and FFI hosts
//!   can substitute their own I/O.
//! - Errors detected locally (bad options, missing `xid`, missing client
//!   secret or webhook url) are reported through the callback before any
//!   request exists.

pub mod catalog;
pub mod client;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod query;
#[cfg(feature = "ureq")]
pub mod ureq_transport;

pub use catalog::{Endpoint, Operation, Resource, SubResource, CATALOG};
pub use client::{Client, Events, RefreshTokenApi, ResourceApi, WebhookApi};
pub use config::Config;
pub use credentials::Credentials;
pub use dispatch::Callback;
pub use error::ApiError;
pub use http::{Completion, HttpMethod, HttpRequest, HttpResponse, SimulatedTransport, Transport};
#[cfg(feature = "ureq")]
pub use ureq_transport::UreqTransport;

/// Crate version, reported by [`Client::version`].
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
