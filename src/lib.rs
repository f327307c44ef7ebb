pub mod app;
pub mod git;
pub mod github_client;
pub mod oauth;
pub mod prompt;

pub use app::{AppConfig, ScaffoldError, ScaffoldOutcome, Scaffolder};
pub use git::{BootstrapError, BootstrapFailure, BootstrapResult, BootstrapStep, LocalRepoBootstrapper};
pub use github_client::{GithubClient, GithubConnector, HostError, RemoteRepository, RepositoryHost};
pub use oauth::{AccessToken, AuthError, Credentials, DeviceAuth, DeviceAuthSession, EnvFileStore};
pub use prompt::{Framework, ProjectAnswers, Prompter, TerminalPrompter};
