use serde::{Deserialize, Serialize};

/// Repository created on the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepository {
    pub name: String,
    #[serde(rename = "private")]
    pub is_private: bool,
    pub html_url: String,
}

#[derive(Debug, Clone)]
pub struct GithubClientConfig {
    /// REST API base URL
    pub api_url: String,
    pub user_agent: String,
}

impl Default for GithubClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            user_agent: concat!("create-app/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `GET /user` response (only the fields we use)
#[derive(Debug, Deserialize)]
pub(crate) struct UserResponse {
    pub login: String,
}

/// `POST /user/repos` request body
#[derive(Debug, Serialize)]
pub(crate) struct CreateRepositoryRequest<'a> {
    pub name: &'a str,
    pub private: bool,
}

/// Error body returned by the REST API
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
}

impl ApiErrorResponse {
    /// All human-readable messages in the body, joined
    pub fn describe(&self) -> String {
        let mut parts = vec![self.message.clone()];
        parts.extend(self.errors.iter().filter_map(|e| match (&e.field, &e.message) {
            (Some(field), Some(message)) => Some(format!("{}: {}", field, message)),
            (None, Some(message)) => Some(message.clone()),
            _ => None,
        }));
        parts.retain(|p| !p.is_empty());
        parts.join("; ")
    }

    pub fn mentions_existing_name(&self) -> bool {
        self.describe().to_lowercase().contains("already exists")
    }
}
