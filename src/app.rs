//! The scaffolding run: prompts, authentication, repository creation, push

use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::git::{BootstrapConfig, BootstrapFailure, BootstrapResult, LocalRepoBootstrapper};
use crate::github_client::{
    GithubClientConfig, HostConnector, HostError, RemoteRepository, RepositoryHost,
};
use crate::oauth::{self, AccessToken, AuthError, CredentialStore, Credentials, DeviceAuth};
use crate::prompt::{ProjectAnswers, Prompter};

/// How many times a rejected token may be replaced within one run
const MAX_REAUTHENTICATIONS: u32 = 1;

/// Application configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env_file: PathBuf,
    pub client_id: Option<String>,
    pub oauth: oauth::Config,
    pub github: GithubClientConfig,
    pub bootstrap: BootstrapConfig,
    pub author_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
            client_id: None,
            oauth: oauth::Config::default(),
            github: GithubClientConfig::default(),
            bootstrap: BootstrapConfig::default(),
            author_name: "Create-App".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the credential file into the environment (existing variables win),
    /// then read settings from it
    pub fn from_env() -> Self {
        let env_file = std::env::var("CREATE_APP_ENV_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".env"));

        match dotenvy::from_path(&env_file) {
            Ok(()) => log::debug!("Loaded environment from {}", env_file.display()),
            Err(e) if e.not_found() => log::debug!("No {} file found", env_file.display()),
            Err(e) => log::warn!("Could not load {}: {}", env_file.display(), e),
        }

        Self::from_lookup(env_file, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(env_file: PathBuf, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            env_file,
            ..Self::default()
        };
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.client_id = lookup(oauth::CLIENT_ID_KEY);
        if let Some(host) = lookup("GITHUB_HOST") {
            config.oauth = oauth::Config::for_host(&host);
        }
        if let Some(api_url) = lookup("GITHUB_API_URL") {
            config.github.api_url = api_url;
        }
        if let Some(author) = lookup("CREATE_APP_AUTHOR") {
            config.author_name = author;
        }
        config
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScaffoldError {
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("could not set up a GitHub client for the token: {0}")]
    Connect(HostError),
    #[error("repository creation failed (nothing was created): {0}")]
    Host(#[from] HostError),
    #[error("repository {repository_url} was created on the host, but {failure}")]
    Bootstrap {
        repository_url: String,
        failure: BootstrapFailure,
    },
}

/// What a run accomplished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaffoldOutcome {
    /// The user did not ask for a repository
    LocalOnly(ProjectAnswers),
    Published {
        answers: ProjectAnswers,
        login: String,
        repository: RemoteRepository,
        bootstrap: BootstrapResult,
    },
}

/// Wires the collaborators together in run order
pub struct Scaffolder<'a> {
    pub prompter: &'a dyn Prompter,
    pub store: &'a dyn CredentialStore,
    pub auth: &'a DeviceAuth,
    pub connector: &'a dyn HostConnector,
    pub bootstrapper: &'a LocalRepoBootstrapper,
    pub config: &'a AppConfig,
}

impl Scaffolder<'_> {
    pub async fn run(&self, cancel: &CancellationToken) -> Result<ScaffoldOutcome, ScaffoldError> {
        let answers = self.prompter.project_answers()?;
        if !answers.techs.is_empty() {
            let techs: Vec<&str> = answers.techs.iter().map(|t| t.as_str()).collect();
            println!("Techs: {}", techs.join(", "));
        }
        println!("Building {} in \"{}\"...", answers.name, answers.directory);

        let create_repository = self.prompter.confirm_create_repository()?;
        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled.into());
        }
        if !create_repository {
            return Ok(ScaffoldOutcome::LocalOnly(answers));
        }

        let (host, token, login) = self.connect(cancel).await?;
        println!("Connected as {}", login);

        let name = self.prompter.repository_name(&answers.name)?;
        let is_private = self.prompter.repository_private()?;
        if cancel.is_cancelled() {
            return Err(AuthError::Cancelled.into());
        }
        let repository = host.create_repository(&name, is_private).await?;
        println!("Repository created: {}", repository.html_url);
        println!("Pushing changes...");

        let bootstrap = self
            .bootstrapper
            .run(
                Path::new(&answers.directory),
                &repository.html_url,
                &token,
                &self.config.author_name,
                &[self.config.env_file.as_path()],
                cancel,
            )
            .await
            .map_err(|failure| ScaffoldError::Bootstrap {
                repository_url: repository.html_url.clone(),
                failure,
            })?;
        println!("Changes pushed to remote repository.");

        Ok(ScaffoldOutcome::Published {
            answers,
            login,
            repository,
            bootstrap,
        })
    }

    /// Obtain a client whose token passes the `who_am_i` probe
    ///
    /// A missing token starts the device flow. A rejected token is replaced at
    /// most `MAX_REAUTHENTICATIONS` times.
    async fn connect(
        &self,
        cancel: &CancellationToken,
    ) -> Result<(Box<dyn RepositoryHost>, AccessToken, String), ScaffoldError> {
        let mut token = match self.store.load().await? {
            Some(Credentials {
                access_token: Some(token),
                ..
            }) => token,
            _ => {
                log::info!("No stored token; starting device authorization");
                self.authenticate(cancel).await?
            }
        };
        let mut reauthentications = 0;

        loop {
            let error = match self.connector.connect(&token) {
                Ok(host) => match host.who_am_i().await {
                    Ok(login) => return Ok((host, token, login)),
                    Err(e) => ScaffoldError::Auth(e),
                },
                Err(e) => ScaffoldError::Connect(e),
            };
            if reauthentications >= MAX_REAUTHENTICATIONS {
                return Err(error);
            }

            log::warn!("Token failed validation ({}); re-authenticating", error);
            println!("{}", reauthentication_notice(&error));
            reauthentications += 1;
            token = self.authenticate(cancel).await?;
        }
    }

    /// Run the device flow and persist the result
    async fn authenticate(&self, cancel: &CancellationToken) -> Result<AccessToken, AuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(AuthError::MissingClientId)?;
        let credentials = self.auth.authenticate(client_id, cancel).await?;
        self.store.save(&credentials).await?;

        credentials.access_token.ok_or_else(|| {
            AuthError::UnexpectedResponse("device flow returned no access token".to_string())
        })
    }
}

/// What to tell the user before signing in again after `error`
fn reauthentication_notice(error: &ScaffoldError) -> &'static str {
    match error {
        ScaffoldError::Auth(AuthError::TokenRejected(_)) => {
            "Your GitHub token is no longer valid, let's sign in again."
        }
        ScaffoldError::Auth(AuthError::Network(_)) => {
            "Could not reach GitHub to check your token, let's sign in again."
        }
        ScaffoldError::Connect(_) => "Your stored GitHub token cannot be used, let's sign in again.",
        _ => "Could not verify your GitHub token, let's sign in again.",
    }
}
