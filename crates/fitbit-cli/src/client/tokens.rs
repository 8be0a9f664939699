use chrono::Utc;
use serde::{Deserialize, Serialize};

/// OAuth2 Bearer token for API requests.
/// Produced by the external browser authorization flow; consumed here as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuth2Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_at: i64,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuth2Token {
    /// Wrap a bare access token (the --token / env input)
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: String::new(),
            token_type: default_token_type(),
            expires_at: 0,
        }
    }

    /// Check if the access token has expired (0 means unknown, assume valid)
    pub fn is_expired(&self) -> bool {
        self.expires_at != 0 && self.expires_at < Utc::now().timestamp()
    }

    /// Returns the Authorization header value.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
