use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Runs the version-control tool in a working directory
#[async_trait::async_trait]
pub trait GitRunner: Send + Sync {
    /// Run git with `args` in `directory`. Returns the combined output and
    /// whether the command exited successfully.
    async fn exec_command_allow_failure(
        &self,
        directory: &Path,
        args: &[String],
    ) -> std::io::Result<(String, bool)>;
}

/// Runs git as a child process
#[derive(Debug, Clone)]
pub struct ProcessGitRunner {
    program: String,
}

impl ProcessGitRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ProcessGitRunner {
    fn default() -> Self {
        Self::new("git")
    }
}

#[async_trait::async_trait]
impl GitRunner for ProcessGitRunner {
    async fn exec_command_allow_failure(
        &self,
        directory: &Path,
        args: &[String],
    ) -> std::io::Result<(String, bool)> {
        log::debug!(
            "Executing {} {:?} in {}",
            self.program,
            redact_args(args),
            directory.display()
        );

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(directory)
            // never block on an interactive credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .output()
            .await?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        log::debug!(
            "Command completed with status: {}, success: {}",
            output.status,
            output.status.success()
        );

        Ok((combined, output.status.success()))
    }
}

/// Config overrides may carry credentials; hide their values in logs
pub(crate) fn redact_args(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, _)) if key.eq_ignore_ascii_case("http.extraHeader") => {
                format!("{}=<redacted>", key)
            }
            _ => arg.clone(),
        })
        .collect()
}
