//! Mutable credential slots shared by every call a client makes.

use serde_json::{Map, Value};

use crate::config::Config;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: Option<String>,
}

impl Credentials {
    /// Assign every credential field present in `values` as a string.
    /// Fields holding any other JSON type are left untouched.
    pub fn apply(&mut self, values: &Map<String, Value>) {
        for (key, value) in values {
            let Some(text) = value.as_str() else {
                continue;
            };
            let slot = match key.as_str() {
                "client_id" => &mut self.client_id,
                "client_secret" => &mut self.client_secret,
                "access_token" => &mut self.access_token,
                _ => continue,
            };
            *slot = Some(text.to_string());
        }
    }

    /// Value of the `Authorization` header for the current token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token.as_deref().unwrap_or_default())
    }
}

impl From<&Config> for Credentials {
    fn from(config: &Config) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            access_token: config.access_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn apply_ignores_non_string_values() {
        let mut creds = Credentials {
            access_token: Some("old".to_string()),
            ..Default::default()
        };
        let update = json!({ "access_token": 7, "client_id": "cid", "other": "x" });
        creds.apply(update.as_object().unwrap());
        assert_eq!(creds.access_token.as_deref(), Some("old"));
        assert_eq!(creds.client_id.as_deref(), Some("cid"));
    }

    #[test]
    fn bearer_header_value() {
        let creds = Credentials {
            access_token: Some("TOK".to_string()),
            ..Default::default()
        };
        assert_eq!(creds.bearer(), "Bearer TOK");
        assert_eq!(Credentials::default().bearer(), "Bearer ");
    }
}
