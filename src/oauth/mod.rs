//! GitHub OAuth device authorization (RFC 8628)
//!
//! The flow is split in two so the caller can show the user code before
//! blocking on the poll loop:
//!
//! ```no_run
//! use create_app::oauth::{Config, DeviceAuth};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), create_app::oauth::AuthError> {
//! let auth = DeviceAuth::with_http(Config::default())?;
//! let session = auth.request_code("Iv1.abc123").await?;
//! println!("Copy code: {}", session.user_code);
//! println!("then open: {}", session.verification_uri);
//! let token = auth
//!     .poll_for_token("Iv1.abc123", &session, &CancellationToken::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tokio_util::sync::CancellationToken;

// Internal modules
mod config;
mod credentials;
mod errors;
mod flow;
mod storage;
mod transport;

// Public re-exports
pub use config::Config;
pub use credentials::{AccessToken, Credentials, TokenPollResponse};
pub use errors::AuthError;
pub use flow::{DeviceAuthSession, DeviceCodeGrant};
pub use storage::{CredentialStore, EnvFileStore, CLIENT_ID_KEY, TOKEN_KEY};
pub use transport::{DeviceEndpoints, HttpDeviceEndpoints};

use flow::{classify_response, PollStep};

/// Device-flow authentication client
pub struct DeviceAuth {
    config: Config,
    endpoints: Box<dyn DeviceEndpoints>,
}

impl std::fmt::Debug for DeviceAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceAuth")
            .field("config", &self.config)
            .field("endpoints", &"<endpoints>")
            .finish()
    }
}

impl DeviceAuth {
    /// Create a client over the given endpoints
    pub fn new(config: Config, endpoints: Box<dyn DeviceEndpoints>) -> Self {
        Self { config, endpoints }
    }

    /// Create a client talking HTTP to the endpoints named in `config`
    pub fn with_http(config: Config) -> Result<Self, AuthError> {
        let endpoints = HttpDeviceEndpoints::new(&config)?;
        Ok(Self::new(config, Box::new(endpoints)))
    }

    /// Request a device code and start a session
    pub async fn request_code(&self, client_id: &str) -> Result<DeviceAuthSession, AuthError> {
        if client_id.trim().is_empty() {
            return Err(AuthError::MissingClientId);
        }

        let grant = self
            .endpoints
            .request_code(client_id, &self.config.scopes)
            .await?;
        let session = DeviceAuthSession::from_grant(grant, &self.config, Instant::now())?;

        log::info!(
            "Device code issued; polling every {}s",
            session.poll_interval.as_secs()
        );
        Ok(session)
    }

    /// Poll the token endpoint until the user authorizes, the code expires,
    /// the host refuses, or `cancel` fires
    ///
    /// Every request waits one interval first. The deadline caps both the
    /// waits and the in-flight request.
    pub async fn poll_for_token(
        &self,
        client_id: &str,
        session: &DeviceAuthSession,
        cancel: &CancellationToken,
    ) -> Result<AccessToken, AuthError> {
        let mut interval = session.poll_interval;
        let mut attempt: u32 = 0;

        loop {
            let wake_at = Instant::now() + interval;
            if wake_at >= session.expires_at {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                    _ = sleep_until(session.expires_at) => {}
                }
                log::warn!("Device code expired after {} poll attempts", attempt);
                return Err(AuthError::Expired);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                _ = sleep_until(wake_at) => {}
            }

            attempt += 1;
            log::debug!("Polling for access token (attempt {})", attempt);

            let request = self.endpoints.request_token(client_id, &session.device_code);
            let response = tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                result = timeout_at(session.expires_at, request) => match result {
                    Ok(response) => response?,
                    Err(_) => return Err(AuthError::Expired),
                },
            };

            if session.is_expired_at(Instant::now()) {
                return Err(AuthError::Expired);
            }

            match classify_response(response, interval, &self.config)? {
                PollStep::Authorized(token) => {
                    log::info!("Device authorization completed after {} attempts", attempt);
                    return Ok(token);
                }
                PollStep::Pending => {
                    log::debug!("Authorization pending");
                }
                PollStep::SlowDown(next) => {
                    log::info!(
                        "Host asked to slow down; poll interval now {}s",
                        next.as_secs()
                    );
                    interval = next.max(interval);
                }
            }
        }
    }

    /// Full device flow: request a code, show it to the user, wait for the token
    pub async fn authenticate(
        &self,
        client_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Credentials, AuthError> {
        let session = self.request_code(client_id).await?;

        println!("Copy code: {}", session.user_code);
        println!("then open: {}", session.verification_uri);
        println!(
            "Waiting for authorization (expires in {}s)...",
            remaining(&session).as_secs()
        );

        let token = self.poll_for_token(client_id, &session, cancel).await?;
        Ok(Credentials::new(client_id, token))
    }
}

fn remaining(session: &DeviceAuthSession) -> Duration {
    session.expires_at.saturating_duration_since(Instant::now())
}
