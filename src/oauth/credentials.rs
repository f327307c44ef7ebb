use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth access token issued by the host
///
/// `Debug` never prints the secret, so tokens can sit inside logged structs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Persisted credentials: the OAuth client id and the token obtained for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub access_token: Option<AccessToken>,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, access_token: AccessToken) -> Self {
        Self {
            client_id: client_id.into(),
            access_token: Some(access_token),
        }
    }
}

/// Response from the device code endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub(crate) struct DeviceCodeResponse {
    pub device_code: Option<String>,
    pub user_code: Option<String>,
    pub verification_uri: Option<String>,
    pub expires_in: Option<u64>,
    pub interval: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Response from the token endpoint: either a token or an OAuth error code
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TokenPollResponse {
    pub access_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
    /// New minimum interval in seconds, sent alongside `slow_down`
    pub interval: Option<u64>,
}

impl TokenPollResponse {
    pub fn token(token: &str) -> Self {
        Self {
            access_token: Some(token.to_string()),
            token_type: Some("bearer".to_string()),
            ..Default::default()
        }
    }

    pub fn error(code: &str) -> Self {
        Self {
            error: Some(code.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_is_redacted() {
        let credentials = Credentials::new("abc123", AccessToken::new("gho_secret"));
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("abc123"));
        assert!(!rendered.contains("gho_secret"));
    }

    #[test]
    fn test_token_poll_response_parses_pending() {
        let response: TokenPollResponse = serde_json::from_str(
            r#"{"error":"authorization_pending","error_description":"waiting","error_uri":"https://docs"}"#,
        )
        .unwrap();
        assert_eq!(response.error.as_deref(), Some("authorization_pending"));
        assert!(response.access_token.is_none());
    }
}
