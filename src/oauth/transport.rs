use reqwest::{Client, StatusCode};
use url::Url;

use crate::oauth::{
    config::Config,
    credentials::{DeviceCodeResponse, TokenPollResponse},
    errors::AuthError,
    flow::DeviceCodeGrant,
};

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// The two device-flow endpoints of an OAuth host
#[async_trait::async_trait]
pub trait DeviceEndpoints: Send + Sync {
    /// Ask the host for a new device code
    async fn request_code(
        &self,
        client_id: &str,
        scopes: &[String],
    ) -> Result<DeviceCodeGrant, AuthError>;

    /// Make a single token request for an outstanding device code
    async fn request_token(
        &self,
        client_id: &str,
        device_code: &str,
    ) -> Result<TokenPollResponse, AuthError>;
}

/// Device endpoints reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpDeviceEndpoints {
    http_client: Client,
    device_code_url: Url,
    token_url: Url,
}

impl HttpDeviceEndpoints {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .user_agent(concat!("create-app/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            device_code_url: Url::parse(&config.device_code_url)?,
            token_url: Url::parse(&config.token_url)?,
        })
    }
}

#[async_trait::async_trait]
impl DeviceEndpoints for HttpDeviceEndpoints {
    async fn request_code(
        &self,
        client_id: &str,
        scopes: &[String],
    ) -> Result<DeviceCodeGrant, AuthError> {
        let scope = scopes.join(" ");
        let params = [("client_id", client_id), ("scope", scope.as_str())];

        log::debug!("Requesting device code from {}", self.device_code_url);
        let response = self
            .http_client
            .post(self.device_code_url.clone())
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        log::debug!("Device code response status: {}", status);

        if matches!(
            status,
            StatusCode::BAD_REQUEST
                | StatusCode::UNAUTHORIZED
                | StatusCode::FORBIDDEN
                | StatusCode::NOT_FOUND
        ) {
            let detail = serde_json::from_str::<DeviceCodeResponse>(&body)
                .ok()
                .and_then(|r| r.error_description.or(r.error))
                .unwrap_or_else(|| format!("{} - {}", status, body.trim()));
            return Err(AuthError::InvalidClient(detail));
        }
        if !status.is_success() {
            return Err(AuthError::UnexpectedResponse(format!(
                "{} - {}",
                status,
                body.trim()
            )));
        }

        let parsed: DeviceCodeResponse = serde_json::from_str(&body)?;
        if let Some(code) = parsed.error.as_deref() {
            return Err(AuthError::from_oauth_code(
                code,
                parsed.error_description.as_deref(),
            ));
        }

        match (parsed.device_code, parsed.user_code, parsed.verification_uri) {
            (Some(device_code), Some(user_code), Some(verification_uri)) => Ok(DeviceCodeGrant {
                device_code,
                user_code,
                verification_uri,
                expires_in: parsed.expires_in.unwrap_or(0),
                interval: parsed.interval,
            }),
            _ => Err(AuthError::UnexpectedResponse(format!(
                "incomplete device code response: {}",
                body.trim()
            ))),
        }
    }

    async fn request_token(
        &self,
        client_id: &str,
        device_code: &str,
    ) -> Result<TokenPollResponse, AuthError> {
        let params = [
            ("client_id", client_id),
            ("device_code", device_code),
            ("grant_type", DEVICE_GRANT_TYPE),
        ];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .header("Accept", "application/json")
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // RFC 8628 hosts answer pending/slow_down with 400 and a JSON error body
        match serde_json::from_str::<TokenPollResponse>(&body) {
            Ok(parsed) if parsed.access_token.is_some() || parsed.error.is_some() => Ok(parsed),
            Ok(_) | Err(_) => Err(AuthError::UnexpectedResponse(format!(
                "{} - {}",
                status,
                body.trim()
            ))),
        }
    }
}
