use std::time::Duration;
use tokio::time::Instant;

use crate::oauth::{
    config::Config,
    credentials::{AccessToken, TokenPollResponse},
    errors::AuthError,
};

/// Device code grant as returned by the device authorization endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCodeGrant {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: Option<u64>,
}

/// An in-progress device authorization
///
/// Created by `DeviceAuth::request_code` and consumed by `poll_for_token`.
#[derive(Debug, Clone)]
pub struct DeviceAuthSession {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    /// Monotonic deadline after which the device code is no longer valid
    pub expires_at: Instant,
    pub poll_interval: Duration,
}

impl DeviceAuthSession {
    /// Start a session from a grant, anchoring the deadline at `now`
    pub(crate) fn from_grant(
        grant: DeviceCodeGrant,
        config: &Config,
        now: Instant,
    ) -> Result<Self, AuthError> {
        if grant.expires_in == 0 {
            return Err(AuthError::UnexpectedResponse(
                "device code was issued already expired".to_string(),
            ));
        }
        if grant.device_code.is_empty() || grant.user_code.is_empty() {
            return Err(AuthError::UnexpectedResponse(
                "device code response is missing codes".to_string(),
            ));
        }

        let poll_interval = grant
            .interval
            .map(Duration::from_secs)
            .unwrap_or(config.default_interval)
            .max(Duration::from_secs(1));

        Ok(Self {
            device_code: grant.device_code,
            user_code: grant.user_code,
            verification_uri: grant.verification_uri,
            expires_at: now + Duration::from_secs(grant.expires_in),
            poll_interval,
        })
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// What the poll loop should do after a token endpoint response
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PollStep {
    Authorized(AccessToken),
    Pending,
    SlowDown(Duration),
}

/// Classify a token endpoint response
///
/// Terminal OAuth errors come back as `Err`.
pub(crate) fn classify_response(
    response: TokenPollResponse,
    current_interval: Duration,
    config: &Config,
) -> Result<PollStep, AuthError> {
    if let Some(token) = response.access_token.filter(|t| !t.is_empty()) {
        return Ok(PollStep::Authorized(AccessToken::new(token)));
    }

    match response.error.as_deref() {
        Some("authorization_pending") => Ok(PollStep::Pending),
        Some("slow_down") => Ok(PollStep::SlowDown(slowed_interval(
            current_interval,
            response.interval,
            config.slow_down_increment,
        ))),
        Some(code) => Err(AuthError::from_oauth_code(
            code,
            response.error_description.as_deref(),
        )),
        None => Err(AuthError::UnexpectedResponse(
            "token response had neither access_token nor error".to_string(),
        )),
    }
}

/// Interval to use after `slow_down`. Never smaller than `current + increment`.
pub(crate) fn slowed_interval(
    current: Duration,
    host_interval: Option<u64>,
    increment: Duration,
) -> Duration {
    let bumped = current + increment;
    match host_interval.map(Duration::from_secs) {
        Some(host) if host > bumped => host,
        _ => bumped,
    }
}
