//! precache server entry point.
//!
//! Boots the offline-first worker (install, then activate when skipping the
//! waiting phase) and serves its lifecycle and cache tools over MCP stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use precache_client::{FetchConfig, HttpNetwork, Worker, WorkerConfig};
use precache_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let worker_config = WorkerConfig::from_app_config(&config)?;

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;
    let network = HttpNetwork::new(FetchConfig::from(&config), worker_config.origin.clone())?;
    let worker = Arc::new(Worker::new(db, network, worker_config));

    match worker.start().await {
        Ok(report) => tracing::info!(
            bucket = %report.install.bucket,
            cached = report.install.cached.len(),
            root_excluded = report.install.root_excluded,
            activated = report.activate.is_some(),
            "worker started"
        ),
        Err(e) => tracing::error!("worker failed to start, requests will pass through: {}", e),
    }

    tracing::info!("Starting precache server on stdio transport");

    let handler = handler::PrecacheServer::new(worker);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
