// TCOA Comparison Dashboard - Web Server
// Serves the dashboard page and its JSON API

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tcoa_dashboard::config::DEFAULT_CONFIG_FILE;
use tcoa_dashboard::{api, init_tracing, Dashboard, Settings};

#[derive(Parser, Debug)]
#[command(name = "tcoa-server", version, about = "Serve the TCOA comparison dashboard")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(&args.config)?;
    settings.override_port(args.port)?;
    init_tracing(&settings.log_level);

    let dataset = settings.load_dataset()?;
    let dashboard = Dashboard::from_settings(dataset, &settings)?;

    let app = api::router(Arc::new(dashboard));

    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(addr = %addr, "Server running (UI at /, API under /api)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
