pub mod errors;
pub mod types;

pub use errors::HostError;
pub use types::{GithubClientConfig, RemoteRepository};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};

use crate::oauth::{AccessToken, AuthError};
use types::{ApiErrorResponse, CreateRepositoryRequest, UserResponse};

/// Authenticated operations against a repository host
#[async_trait::async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Login of the token's owner. Used as a token validity probe.
    async fn who_am_i(&self) -> Result<String, AuthError>;

    /// Create a repository owned by the authenticated user
    async fn create_repository(
        &self,
        name: &str,
        is_private: bool,
    ) -> Result<RemoteRepository, HostError>;
}

/// Builds a host client bound to a token
pub trait HostConnector: Send + Sync {
    fn connect(&self, token: &AccessToken) -> Result<Box<dyn RepositoryHost>, HostError>;
}

/// GitHub REST client bound to one access token
#[derive(Debug, Clone)]
pub struct GithubClient {
    http_client: Client,
    config: GithubClientConfig,
}

impl GithubClient {
    /// Bind `token` to a new client. No request is made.
    pub fn new(config: GithubClientConfig, token: &AccessToken) -> Result<Self, HostError> {
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|_| {
                HostError::Unauthorized("token contains invalid header characters".to_string())
            })?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http_client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn error_body(response: Response) -> ApiErrorResponse {
        let text = response.text().await.unwrap_or_default();
        serde_json::from_str::<ApiErrorResponse>(&text).unwrap_or_else(|_| ApiErrorResponse {
            message: text.trim().to_string(),
            errors: Vec::new(),
        })
    }
}

#[async_trait::async_trait]
impl RepositoryHost for GithubClient {
    async fn who_am_i(&self) -> Result<String, AuthError> {
        let response = self.http_client.get(self.endpoint("/user")).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            log::warn!("GET /user rejected the token with {}", status);
            return Err(AuthError::TokenRejected(status.as_u16()));
        }
        if !status.is_success() {
            let body = Self::error_body(response).await;
            return Err(AuthError::UnexpectedResponse(format!(
                "GET /user returned {}: {}",
                status,
                body.describe()
            )));
        }

        let user: UserResponse = response.json().await?;
        log::debug!("Token belongs to {}", user.login);
        Ok(user.login)
    }

    async fn create_repository(
        &self,
        name: &str,
        is_private: bool,
    ) -> Result<RemoteRepository, HostError> {
        log::info!(
            "Creating {} repository '{}'",
            if is_private { "private" } else { "public" },
            name
        );

        let response = self
            .http_client
            .post(self.endpoint("/user/repos"))
            .json(&CreateRepositoryRequest {
                name,
                private: is_private,
            })
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            let repository: RemoteRepository = response.json().await?;
            log::info!("Repository available at {}", repository.html_url);
            return Ok(repository);
        }

        let body = Self::error_body(response).await;
        log::error!("Repository creation failed with {}: {}", status, body.describe());

        match status {
            StatusCode::UNPROCESSABLE_ENTITY if body.mentions_existing_name() => {
                Err(HostError::NameConflict(name.to_string()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(HostError::Unauthorized(body.describe()))
            }
            _ => Err(HostError::Unexpected {
                status: status.as_u16(),
                message: body.describe(),
            }),
        }
    }
}

/// Connector producing `GithubClient`s
#[derive(Debug, Clone, Default)]
pub struct GithubConnector {
    config: GithubClientConfig,
}

impl GithubConnector {
    pub fn new(config: GithubClientConfig) -> Self {
        Self { config }
    }
}

impl HostConnector for GithubConnector {
    fn connect(&self, token: &AccessToken) -> Result<Box<dyn RepositoryHost>, HostError> {
        Ok(Box::new(GithubClient::new(self.config.clone(), token)?))
    }
}
