// Main entry point for the page-watch daemon

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use page_watch::{
    run_control_loop, AppConfig, ConsoleReporter, HtmlExtractor, JsonFileStore, Poller,
    PollerConfig, WatchConfig,
};
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Watch web pages and report items that were not seen before.
///
/// Type `quit` and press enter to stop.
#[derive(Debug, Parser)]
#[command(name = "page-watch", version)]
struct Cli {
    /// Watch config file (overrides PAGE_WATCH_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seen-records state file (overrides PAGE_WATCH_STATE)
    #[arg(long)]
    state: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,page_watch=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let cli = Cli::parse();

    let mut app = AppConfig::from_env().context("Failed to load settings")?;
    if let Some(path) = cli.config {
        app = app.with_config_path(path);
    }
    if let Some(path) = cli.state {
        app = app.with_state_path(path);
    }

    let watch = WatchConfig::load(&app.config_path)
        .with_context(|| format!("Failed to load config {}", app.config_path.display()))?;
    tracing::info!(
        config = %app.config_path.display(),
        state = %app.state_path.display(),
        sources = watch.sources.len(),
        check_interval_minutes = watch.check_interval,
        "Configuration loaded"
    );

    let extractor = HtmlExtractor::new().context("Failed to create HTTP client")?;
    let store = JsonFileStore::load(&app.state_path).await;
    let poller = Poller::new(
        extractor,
        store,
        ConsoleReporter::stdout(),
        watch.sources.clone(),
        PollerConfig::from_configs(&watch, &app),
    );

    let cancel = CancellationToken::new();
    let poller_handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { poller.run(cancel).await })
    };

    let control_cancel = cancel.clone();
    tokio::spawn(async move {
        let stdin = BufReader::new(tokio::io::stdin());
        let exit = run_control_loop(stdin, control_cancel).await;
        tracing::debug!(?exit, "Control loop finished");
    });

    poller_handle.await.context("Poller task panicked")?;
    tracing::info!("Shutdown complete");

    Ok(())
}
