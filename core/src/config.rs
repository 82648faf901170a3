//! Client configuration.
//!
//! Settings come either from the process environment or from a JSON mapping.
//! Only string fields are honoured; anything else in a mapping is ignored.

use serde::Deserialize;
use serde_json::Value;

/// Production API root, pinned to revision 1.1.
pub const DEFAULT_BASE_URL: &str = "https://jawbone.com/nudge/api/v.1.1";

pub const ENV_CLIENT_ID: &str = "JAWBONE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "JAWBONE_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "JAWBONE_ACCESS_TOKEN";
pub const ENV_BASE_URL: &str = "JAWBONE_BASE_URL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Overrides [`DEFAULT_BASE_URL`], e.g. to target a local mock.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            client_id: std::env::var(ENV_CLIENT_ID).ok(),
            client_secret: std::env::var(ENV_CLIENT_SECRET).ok(),
            access_token: std::env::var(ENV_ACCESS_TOKEN).ok(),
            base_url: std::env::var(ENV_BASE_URL).ok(),
        }
    }

    /// Read settings from a JSON mapping. Non-mapping input yields the
    /// default config; non-string fields are skipped.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            client_id: field("client_id"),
            client_secret: field("client_secret"),
            access_token: field("access_token"),
            base_url: field("base_url"),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}
