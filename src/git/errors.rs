use super::types::{BootstrapResult, BootstrapStep};

/// Why a bootstrap step failed
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("remote 'origin' already points at {existing}, not {requested}")]
    RemoteExists { existing: String, requested: String },
    #[error("nothing to commit: no files were staged")]
    NothingToCommit,
    #[error("push was rejected:\n{output}")]
    PushRejected { output: String },
    #[error("git {step} failed:\n{output}")]
    ToolInvocationFailed { step: BootstrapStep, output: String },
    #[error("cancelled before {0}")]
    Cancelled(BootstrapStep),
}

/// A failed bootstrap run: where it stopped and what had already happened
#[derive(Debug, thiserror::Error)]
#[error("bootstrap failed at {step} (completed steps: {completed}): {error}")]
pub struct BootstrapFailure {
    pub step: BootstrapStep,
    pub completed: BootstrapResult,
    pub error: BootstrapError,
}
