//! Traffic Dashboard Server
//!
//! Run with: cargo run
//!
//! # Configuration
//!
//! Config file (TOML) is searched in the usual locations, or passed with
//! `--config`. Environment variables override it:
//! - `TRAFFIC_GCP_CREDENTIALS_FILE`: Path to the service account key
//! - `TRAFFIC_GCP_CREDENTIALS`: Inline service account key JSON
//! - `TRAFFIC_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `TRAFFIC_API_PORT`: Port to listen on (default: 8088)
//! - `TRAFFIC_LOG_LEVEL` / `TRAFFIC_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Fine-grained log filter (overrides the level above)

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use traffic_dashboard::api::{serve, ApiConfig, AppState};
use traffic_dashboard::bigquery::BigQueryClient;
use traffic_dashboard::config::Config;

/// San Jose Traffic Dashboard server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config);

    tracing::info!(
        "Starting traffic dashboard v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Credentials first: without a valid secret there is no client and no
    // point binding the listener.
    let key = config
        .gcp
        .load_key()
        .context("Error loading Google Cloud credentials")?;
    tracing::info!(project = %key.project_id, "Loaded service account credentials");

    let client = Arc::new(BigQueryClient::new(key));

    let api_config = ApiConfig {
        host: config.api.host.clone(),
        port: config.api.port,
        request_timeout_ms: config.api.request_timeout_secs * 1000,
    };

    let state = AppState::new(client, api_config.clone());
    serve(state, &api_config).await?;

    tracing::info!("Traffic dashboard stopped");
    Ok(())
}

/// Initialize tracing from the logging config
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "traffic_dashboard={},tower_http=debug",
            config.logging.level
        )
        .into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
