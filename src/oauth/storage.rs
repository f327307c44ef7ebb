use crate::oauth::{
    credentials::{AccessToken, Credentials},
    errors::AuthError,
};
use std::io::ErrorKind;
use std::path::PathBuf;

pub const CLIENT_ID_KEY: &str = "OAUTH_CLIENT_ID";
pub const TOKEN_KEY: &str = "GITHUB_TOKEN";

/// Trait for credential storage operations
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load stored credentials. `None` means "not authenticated yet".
    async fn load(&self) -> Result<Option<Credentials>, AuthError>;

    /// Persist credentials, replacing any previously stored ones
    async fn save(&self, credentials: &Credentials) -> Result<(), AuthError>;
}

/// Credentials kept in a dotenv-style `KEY=value` file
#[derive(Debug, Clone)]
pub struct EnvFileStore {
    path: PathBuf,
}

impl EnvFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_entries(&self) -> Result<Option<Vec<(String, String)>>, AuthError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuthError::Io(e)),
        };

        let entries = dotenvy::from_read_iter(content.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                AuthError::Io(std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("{}: {}", self.path.display(), e),
                ))
            })?;
        Ok(Some(entries))
    }

    /// Write `content` next to the target and rename it into place
    async fn write_atomically(&self, content: String) -> Result<(), AuthError> {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".env".to_string());
        let temp_path = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&temp_path, content).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(AuthError::Io(e));
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(AuthError::Io(e));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CredentialStore for EnvFileStore {
    async fn load(&self) -> Result<Option<Credentials>, AuthError> {
        let entries = match self.read_entries().await? {
            Some(entries) => entries,
            None => {
                log::debug!("No credential file at {}", self.path.display());
                return Ok(None);
            }
        };

        let lookup = |key: &str| {
            entries
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .filter(|v| !v.is_empty())
        };

        match (lookup(CLIENT_ID_KEY), lookup(TOKEN_KEY)) {
            (Some(client_id), Some(token)) => Ok(Some(Credentials {
                client_id,
                access_token: Some(AccessToken::new(token)),
            })),
            _ => Ok(None),
        }
    }

    async fn save(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let mut entries: Vec<(String, String)> = self
            .read_entries()
            .await?
            .unwrap_or_default()
            .into_iter()
            .filter(|(key, _)| key != CLIENT_ID_KEY && key != TOKEN_KEY)
            .collect();

        entries.push((CLIENT_ID_KEY.to_string(), credentials.client_id.clone()));
        if let Some(token) = &credentials.access_token {
            entries.push((TOKEN_KEY.to_string(), token.as_str().to_string()));
        }

        let content: String = entries
            .iter()
            .map(|(key, value)| format!("{}={}\n", key, format_value(value)))
            .collect();

        self.write_atomically(content).await?;
        log::info!("Saved credentials to {}", self.path.display());
        Ok(())
    }
}

/// Render a value so that the dotenv parser reads it back unchanged
fn format_value(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '@'));

    if plain {
        value.to_string()
    } else if !value.contains('\'') && !value.contains('\n') {
        format!("'{}'", value)
    } else {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        for c in value.chars() {
            match c {
                '\\' | '"' | '$' => {
                    quoted.push('\\');
                    quoted.push(c);
                }
                '\n' => quoted.push_str("\\n"),
                _ => quoted.push(c),
            }
        }
        quoted.push('"');
        quoted
    }
}
