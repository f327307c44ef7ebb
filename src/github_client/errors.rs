/// Errors returned by repository host operations
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("A repository named '{0}' already exists on this account")]
    NameConflict(String),
    #[error("The host rejected the access token: {0}")]
    Unauthorized(String),
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Unexpected response from host (HTTP {status}): {message}")]
    Unexpected { status: u16, message: String },
}
