//! Bootstrap sequence against a real git executable
//!
//! Remotes are local bare repositories, so no network is needed. Tests are
//! skipped when git is not installed.


use std::path::Path;
use std::process::Command;

use rstest::*;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use create_app::git::{
    BootstrapConfig, BootstrapError, BootstrapFailure, BootstrapResult, BootstrapStep,
    LocalRepoBootstrapper,
};
use create_app::oauth::{AccessToken, CredentialStore, Credentials, EnvFileStore};
use test_utils::{git, git_available};

struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn project(&self) -> std::path::PathBuf {
        self.root.path().join("my-app")
    }

    fn remote(&self) -> std::path::PathBuf {
        self.root.path().join("remote.git")
    }

    fn remote_url(&self) -> String {
        self.remote().to_string_lossy().into_owned()
    }
}

#[fixture]
fn workspace() -> Workspace {
    let root = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(root.path().join("my-app")).unwrap();
    Workspace { root }
}

fn with_bare_remote(workspace: &Workspace) {
    std::fs::create_dir_all(workspace.remote()).unwrap();
    git(&workspace.remote(), &["init", "--bare"]);
}

async fn bootstrap(
    directory: &Path,
    remote_url: &str,
) -> Result<BootstrapResult, BootstrapFailure> {
    bootstrap_excluding(directory, remote_url, &[]).await
}

async fn bootstrap_excluding(
    directory: &Path,
    remote_url: &str,
    exclude: &[&Path],
) -> Result<BootstrapResult, BootstrapFailure> {
    LocalRepoBootstrapper::with_process_runner(BootstrapConfig::default())
        .run(
            directory,
            remote_url,
            &AccessToken::new("tok_xyz"),
            "Create-App",
            exclude,
            &CancellationToken::new(),
        )
        .await
}

fn has_head(directory: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--verify", "HEAD"])
        .current_dir(directory)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[rstest]
#[tokio::test]
async fn test_readme_is_committed_and_pushed(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    with_bare_remote(&workspace);
    std::fs::write(workspace.project().join("README.md"), "# my-app\n").unwrap();

    let result = bootstrap(&workspace.project(), &workspace.remote_url())
        .await
        .unwrap();

    assert_eq!(result.completed, BootstrapStep::ALL.to_vec());
    assert_eq!(
        git(&workspace.project(), &["log", "-1", "--format=%s|%an"]).trim(),
        "Initial commit|Create-App"
    );
    assert_eq!(
        git(&workspace.remote(), &["log", "--all", "--format=%s"]).trim(),
        "Initial commit"
    );
    assert_eq!(
        git(&workspace.project(), &["remote", "get-url", "origin"]).trim(),
        workspace.remote_url()
    );
}

#[rstest]
#[tokio::test]
async fn test_empty_directory_has_nothing_to_commit(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    with_bare_remote(&workspace);

    let failure = bootstrap(&workspace.project(), &workspace.remote_url())
        .await
        .unwrap_err();

    assert_eq!(failure.step, BootstrapStep::Commit);
    assert!(matches!(failure.error, BootstrapError::NothingToCommit));
    assert_eq!(
        failure.completed.completed,
        vec![
            BootstrapStep::Init,
            BootstrapStep::RemoteAdd,
            BootstrapStep::StageAll
        ]
    );
    assert!(!has_head(&workspace.project()));
    assert!(git(&workspace.remote(), &["for-each-ref"]).trim().is_empty());
}

#[rstest]
#[tokio::test]
async fn test_push_failure_keeps_local_commit(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    std::fs::write(workspace.project().join("README.md"), "# my-app\n").unwrap();
    let missing_remote = workspace.root.path().join("missing.git");

    let failure = bootstrap(&workspace.project(), &missing_remote.to_string_lossy())
        .await
        .unwrap_err();

    assert_eq!(failure.step, BootstrapStep::Push);
    assert!(failure.completed.contains(BootstrapStep::Commit));
    match &failure.error {
        BootstrapError::PushRejected { output } => assert!(!output.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        git(&workspace.project(), &["log", "-1", "--format=%s"]).trim(),
        "Initial commit"
    );
}

#[rstest]
#[tokio::test]
async fn test_existing_history_is_preserved(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    with_bare_remote(&workspace);
    let project = workspace.project();
    git(&project, &["init"]);
    std::fs::write(project.join("package.json"), "{}\n").unwrap();
    git(&project, &["add", "-A"]);
    git(
        &project,
        &[
            "-c",
            "user.name=Someone",
            "-c",
            "user.email=someone@example.com",
            "commit",
            "-m",
            "Earlier work",
        ],
    );
    std::fs::write(project.join("README.md"), "# my-app\n").unwrap();

    bootstrap(&project, &workspace.remote_url()).await.unwrap();

    assert_eq!(
        git(&project, &["log", "--format=%s"]).trim(),
        "Initial commit\nEarlier work"
    );
}

#[rstest]
#[tokio::test]
async fn test_conflicting_origin_is_not_replaced(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let project = workspace.project();
    git(&project, &["init"]);
    git(
        &project,
        &["remote", "add", "origin", "https://github.com/someone/else"],
    );
    std::fs::write(project.join("README.md"), "# my-app\n").unwrap();

    let failure = bootstrap(&project, &workspace.remote_url())
        .await
        .unwrap_err();

    assert_eq!(failure.step, BootstrapStep::RemoteAdd);
    assert!(matches!(
        failure.error,
        BootstrapError::RemoteExists { ref existing, .. } if existing == "https://github.com/someone/else"
    ));
    assert!(!has_head(&project));
}

#[rstest]
#[tokio::test]
async fn test_missing_directory_is_created(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    let nested = workspace.root.path().join("nested").join("app");

    let failure = bootstrap(&nested, &workspace.remote_url())
        .await
        .unwrap_err();

    assert!(nested.join(".git").exists());
    assert!(matches!(failure.error, BootstrapError::NothingToCommit));
}

#[rstest]
#[tokio::test]
async fn test_credential_file_is_never_pushed(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    with_bare_remote(&workspace);
    let project = workspace.project();
    std::fs::write(project.join("README.md"), "# my-app\n").unwrap();
    let env_file = project.join(".env");
    EnvFileStore::new(&env_file)
        .save(&Credentials::new("Iv1.abc", AccessToken::new("gho_SECRET")))
        .await
        .unwrap();

    bootstrap_excluding(&project, &workspace.remote_url(), &[env_file.as_path()])
        .await
        .unwrap();

    let pushed = git(&workspace.remote(), &["log", "--all", "--name-only", "--format="]);
    assert!(pushed.lines().any(|file| file == "README.md"));
    assert!(!pushed.lines().any(|file| file == ".env"));
    assert!(env_file.exists());
    assert_eq!(
        git(&project, &["status", "--porcelain"]).trim(),
        "?? .env"
    );
}

#[rstest]
#[tokio::test]
async fn test_only_credential_file_means_nothing_to_commit(workspace: Workspace) {
    if !git_available() {
        eprintln!("git not available, skipping");
        return;
    }
    with_bare_remote(&workspace);
    let env_file = workspace.project().join(".env");
    std::fs::write(&env_file, "GITHUB_TOKEN=gho_SECRET\n").unwrap();

    let failure = bootstrap_excluding(
        &workspace.project(),
        &workspace.remote_url(),
        &[env_file.as_path()],
    )
    .await
    .unwrap_err();

    assert!(matches!(failure.error, BootstrapError::NothingToCommit));
    assert!(git(&workspace.remote(), &["for-each-ref"]).trim().is_empty());
}
