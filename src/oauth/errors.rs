/// Errors that can occur during the device authorization flow
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("OAuth client id was rejected by the host: {0}")]
    InvalidClient(String),
    #[error("Authorization was denied by the user")]
    AccessDenied,
    #[error("Device code expired before authorization completed")]
    Expired,
    #[error("Authorization was cancelled")]
    Cancelled,
    #[error("Access token was rejected by the host (HTTP {0})")]
    TokenRejected(u16),
    #[error("No OAuth client id configured (set OAUTH_CLIENT_ID)")]
    MissingClientId,
    #[error("Unexpected response from host: {0}")]
    UnexpectedResponse(String),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Credential file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthError {
    /// Map an OAuth `error` code returned by the host to an error variant
    pub(crate) fn from_oauth_code(code: &str, description: Option<&str>) -> Self {
        let detail = match description {
            Some(description) => format!("{}: {}", code, description),
            None => code.to_string(),
        };

        match code {
            "access_denied" => AuthError::AccessDenied,
            "expired_token" => AuthError::Expired,
            "invalid_client"
            | "unauthorized_client"
            | "incorrect_client_credentials"
            | "unsupported_grant_type"
            | "device_flow_disabled" => AuthError::InvalidClient(detail),
            _ => AuthError::UnexpectedResponse(detail),
        }
    }
}
