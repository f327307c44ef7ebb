use anyhow::Context;
use tokio_util::sync::CancellationToken;

use create_app::github_client::GithubConnector;
use create_app::oauth::{DeviceAuth, EnvFileStore};
use create_app::{AppConfig, LocalRepoBootstrapper, ScaffoldOutcome, Scaffolder, TerminalPrompter};

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    log::debug!("Using configuration: {:?}", config);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, cancelling");
            eprintln!("Cancelling... press Ctrl-C again to exit immediately.");
            interrupt.cancel();
        }
        // a blocking prompt cannot observe the token
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(130);
        }
    });

    let prompter = TerminalPrompter;
    let store = EnvFileStore::new(config.env_file.clone());
    let auth = DeviceAuth::with_http(config.oauth.clone())
        .context("failed to set up device authorization")?;
    let connector = GithubConnector::new(config.github.clone());
    let bootstrapper = LocalRepoBootstrapper::with_process_runner(config.bootstrap.clone());

    let scaffolder = Scaffolder {
        prompter: &prompter,
        store: &store,
        auth: &auth,
        connector: &connector,
        bootstrapper: &bootstrapper,
        config: &config,
    };

    match scaffolder.run(&cancel).await? {
        ScaffoldOutcome::LocalOnly(answers) => {
            log::info!("Finished {} without a remote repository", answers.name);
        }
        ScaffoldOutcome::Published {
            repository,
            bootstrap,
            ..
        } => {
            log::info!(
                "Published {} (steps: {})",
                repository.html_url,
                bootstrap
            );
        }
    }
    Ok(())
}
