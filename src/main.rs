//! Entry point for the media grabber service.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use grabber_core::{AppState, JobCoordinator, YtDlpExtractor, build_router};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let config = Arc::new(args.to_service_config());
    config.validate().context("invalid configuration")?;

    let engine = Arc::new(YtDlpExtractor::new(config.engine.clone()));
    let coordinator = JobCoordinator::new(&config, engine);
    coordinator
        .store()
        .ensure_directory_exists()
        .context("preparing artifact directory")?;

    let app = build_router(AppState::new(coordinator));

    let addr = args.bind_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;
    info!(
        %addr,
        download_dir = %config.download_dir.display(),
        retention_secs = config.retention.as_secs(),
        engine = %config.engine.binary.display(),
        "media grabber listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    info!("media grabber stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
