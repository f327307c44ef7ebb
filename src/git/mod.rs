//! Local repository bootstrap: init, remote-add, stage-all, commit, push
//!
//! Steps run strictly in order and the first failure stops the run. The
//! remote repository must already exist; nothing here creates or deletes it.

pub mod errors;
pub mod executor;
pub mod types;

pub use errors::{BootstrapError, BootstrapFailure};
pub use executor::{GitRunner, ProcessGitRunner};
pub use types::{BootstrapConfig, BootstrapResult, BootstrapStep};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::oauth::AccessToken;

/// Everything a single run needs
struct RunContext<'a> {
    directory: &'a Path,
    remote_url: &'a str,
    token: &'a AccessToken,
    author_name: &'a str,
    exclude: &'a [&'a Path],
}

pub struct LocalRepoBootstrapper {
    runner: Box<dyn GitRunner>,
    config: BootstrapConfig,
}

impl std::fmt::Debug for LocalRepoBootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRepoBootstrapper")
            .field("config", &self.config)
            .field("runner", &"<runner>")
            .finish()
    }
}

impl LocalRepoBootstrapper {
    pub fn new(config: BootstrapConfig, runner: Box<dyn GitRunner>) -> Self {
        Self { runner, config }
    }

    /// Bootstrapper that shells out to the configured git executable
    pub fn with_process_runner(config: BootstrapConfig) -> Self {
        let runner = ProcessGitRunner::new(config.git_program.clone());
        Self::new(config, Box::new(runner))
    }

    /// Run every step against `directory`, pushing to `remote_url`
    ///
    /// Files in `exclude` that lie inside `directory` are never staged.
    /// `cancel` is honoured before each step. A push that has started runs to
    /// completion.
    pub async fn run(
        &self,
        directory: &Path,
        remote_url: &str,
        token: &AccessToken,
        author_name: &str,
        exclude: &[&Path],
        cancel: &CancellationToken,
    ) -> Result<BootstrapResult, BootstrapFailure> {
        let ctx = RunContext {
            directory,
            remote_url,
            token,
            author_name,
            exclude,
        };
        let mut result = BootstrapResult::default();

        for step in BootstrapStep::ALL {
            if cancel.is_cancelled() {
                log::warn!("Bootstrap cancelled before {}", step);
                return Err(BootstrapFailure {
                    step,
                    completed: result,
                    error: BootstrapError::Cancelled(step),
                });
            }

            log::info!("Bootstrap step: {}", step);
            if let Err(error) = self.run_step(step, &ctx).await {
                log::error!("Bootstrap step {} failed: {}", step, error);
                return Err(BootstrapFailure {
                    step,
                    completed: result,
                    error,
                });
            }
            result.completed.push(step);
        }

        Ok(result)
    }

    async fn run_step(&self, step: BootstrapStep, ctx: &RunContext<'_>) -> Result<(), BootstrapError> {
        match step {
            BootstrapStep::Init => {
                tokio::fs::create_dir_all(ctx.directory)
                    .await
                    .map_err(|e| BootstrapError::ToolInvocationFailed {
                        step,
                        output: format!("cannot create {}: {}", ctx.directory.display(), e),
                    })?;
                self.git(step, ctx.directory, &["init"]).await.map(drop)
            }
            BootstrapStep::RemoteAdd => self.add_remote(ctx).await,
            BootstrapStep::StageAll => self.stage_all(ctx).await,
            BootstrapStep::Commit => self.commit(ctx).await,
            BootstrapStep::Push => self.push(ctx).await,
        }
    }

    async fn add_remote(&self, ctx: &RunContext<'_>) -> Result<(), BootstrapError> {
        let step = BootstrapStep::RemoteAdd;
        let remote = self.config.remote_name.as_str();

        let (output, exists) = self
            .exec(step, ctx.directory, &["remote", "get-url", remote])
            .await?;
        if exists {
            let existing = output.trim();
            if existing == ctx.remote_url {
                log::info!("Remote {} already points at {}", remote, existing);
                return Ok(());
            }
            return Err(BootstrapError::RemoteExists {
                existing: existing.to_string(),
                requested: ctx.remote_url.to_string(),
            });
        }

        self.git(step, ctx.directory, &["remote", "add", remote, ctx.remote_url])
            .await
            .map(drop)
    }

    async fn stage_all(&self, ctx: &RunContext<'_>) -> Result<(), BootstrapError> {
        let excluded = excluded_pathspecs(ctx.directory, ctx.exclude).await;

        let mut args = vec!["add", "-A"];
        if !excluded.is_empty() {
            args.extend(["--", "."]);
            args.extend(excluded.iter().map(String::as_str));
        }
        self.git(BootstrapStep::StageAll, ctx.directory, &args)
            .await
            .map(drop)
    }

    async fn commit(&self, ctx: &RunContext<'_>) -> Result<(), BootstrapError> {
        let step = BootstrapStep::Commit;

        let status = self
            .git(step, ctx.directory, &["status", "--porcelain"])
            .await?;
        if !has_staged_changes(&status) {
            return Err(BootstrapError::NothingToCommit);
        }

        let name = format!("user.name={}", ctx.author_name);
        let email = format!("user.email={}", self.config.author_email);
        self.git(
            step,
            ctx.directory,
            &[
                "-c",
                &name,
                "-c",
                &email,
                "commit",
                "-m",
                &self.config.commit_message,
            ],
        )
        .await
        .map(drop)
    }

    async fn push(&self, ctx: &RunContext<'_>) -> Result<(), BootstrapError> {
        let step = BootstrapStep::Push;
        let header = format!(
            "http.extraHeader=Authorization: Basic {}",
            basic_credentials(&self.config.push_username, ctx.token)
        );

        let (output, success) = self
            .exec(
                step,
                ctx.directory,
                &[
                    "-c",
                    &header,
                    "push",
                    "-u",
                    &self.config.remote_name,
                    "HEAD",
                ],
            )
            .await?;
        if success {
            log::debug!("Push output: {}", output.trim());
            Ok(())
        } else {
            Err(BootstrapError::PushRejected {
                output: output.trim().to_string(),
            })
        }
    }

    /// Run git and require success
    async fn git(
        &self,
        step: BootstrapStep,
        directory: &Path,
        args: &[&str],
    ) -> Result<String, BootstrapError> {
        let (output, success) = self.exec(step, directory, args).await?;
        if success {
            Ok(output)
        } else {
            Err(BootstrapError::ToolInvocationFailed {
                step,
                output: output.trim().to_string(),
            })
        }
    }

    /// Run git, reporting exit status instead of failing on it
    async fn exec(
        &self,
        step: BootstrapStep,
        directory: &Path,
        args: &[&str],
    ) -> Result<(String, bool), BootstrapError> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.runner
            .exec_command_allow_failure(directory, &args)
            .await
            .map_err(|e| BootstrapError::ToolInvocationFailed {
                step,
                output: format!("failed to run git: {}", e),
            })
    }
}

/// `git status --porcelain` lines whose index column is set are staged
fn has_staged_changes(porcelain: &str) -> bool {
    porcelain
        .lines()
        .filter_map(|line| line.chars().next())
        .any(|index| index != ' ' && index != '?' && index != '!')
}

/// `:(exclude)` pathspecs for the entries of `paths` inside `directory`
///
/// Paths that do not exist are skipped: there is nothing to stage.
async fn excluded_pathspecs(directory: &Path, paths: &[&Path]) -> Vec<String> {
    let Ok(root) = tokio::fs::canonicalize(directory).await else {
        return Vec::new();
    };

    let mut pathspecs = Vec::new();
    for path in paths {
        let Ok(path) = tokio::fs::canonicalize(path).await else {
            continue;
        };
        match path.strip_prefix(&root) {
            Ok(relative) if !relative.as_os_str().is_empty() => {
                log::debug!("Keeping {} out of the commit", relative.display());
                pathspecs.push(format!(":(exclude){}", relative.to_string_lossy()));
            }
            _ => {}
        }
    }
    pathspecs
}

fn basic_credentials(username: &str, token: &AccessToken) -> String {
    STANDARD.encode(format!("{}:{}", username, token.as_str()))
}
