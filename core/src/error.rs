//! Error types for the nudge API client.
//!
//! # Design
//! Every error the core raises itself is detected before the transport is
//! touched and reaches the caller through the same completion callback a
//! successful body would. `Transport` is the only variant produced after
//! dispatch; it carries the transport's own message untouched.
//!
//! All variants render to the uniform `{ "error": true, "message": ... }`
//! shape via [`ApiError::to_json`].

use serde_json::{json, Value};

/// Errors delivered to completion callbacks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The options argument was not a JSON object.
    #[error("Bad parameters: options object required")]
    BadParameters,

    /// An id-scoped operation was called without a usable `xid`.
    #[error("No xid provided. Please specify a xid.")]
    MissingIdentifier,

    /// A required client setting (client secret, webhook url) is absent.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    /// The resource does not expose the requested operation.
    #[error("Unsupported operation: {resource}.{operation}")]
    Unsupported {
        resource: &'static str,
        operation: String,
    },

    /// The injected transport failed before a response body was available.
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    /// The human-readable message, identical to `Display`.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Render as `{ "error": true, "message": "..." }`.
    pub fn to_json(&self) -> Value {
        json!({ "error": true, "message": self.to_string() })
    }

    /// True when the error was raised locally and no request was sent.
    pub fn is_local(&self) -> bool {
        !matches!(self, ApiError::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_parameters_message() {
        assert_eq!(
            ApiError::BadParameters.to_string(),
            "Bad parameters: options object required"
        );
    }

    #[test]
    fn to_json_has_error_flag_and_message() {
        let value = ApiError::MissingIdentifier.to_json();
        assert_eq!(value["error"], true);
        assert_eq!(value["message"], "No xid provided. Please specify a xid.");
    }

    #[test]
    fn missing_configuration_names_the_setting() {
        let err = ApiError::MissingConfiguration("client secret");
        assert_eq!(err.message(), "Missing configuration: client secret");
    }

    #[test]
    fn transport_message_passes_through() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert!(!err.is_local());
        assert!(ApiError::BadParameters.is_local());
    }
}
