//! kubedeps - a dependency-graph server for Kubernetes resources
//!
//! Discovers relationships among live cluster objects (ownership, volume
//! and config usage, service selectors, scheduling) and among CRD schemas,
//! and serves the resulting graphs over HTTP in JSON, CSV, and Markdown.

mod api;
mod cli;
mod config;
mod crd;
mod export;
mod graph;
mod kube;
mod models;
mod services;

use anyhow::{Context, Result};
use clap::Parser;
use config::ConfigLoader;
use services::DependencyService;
use std::path::PathBuf;
use std::sync::Arc;

/// kubedeps - a dependency-graph server for Kubernetes resources
#[derive(Parser, Debug)]
#[command(name = "kubedeps")]
#[command(about = "Serve dependency graphs of Kubernetes resources and CRD schemas", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd')]
    debug: bool,

    /// Bind address (overrides config file)
    #[arg(long, short = 'b')]
    bind: Option<String>,

    /// Path to the configuration file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    cli::init_logging(args.debug);

    let mut config = ConfigLoader::load(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    let config = Arc::new(config);

    tracing::debug!(
        "Configuration loaded: bind={}, deadlineMs={}, maxCrds={}",
        config.server.bind,
        config.limits.deadline_ms,
        config.limits.max_crds
    );

    // Initialize Kubernetes client
    tracing::debug!("Initializing Kubernetes client");
    let client = kube::create_client()
        .await
        .context("Failed to create Kubernetes client")?;

    let service = Arc::new(DependencyService::new(client, config.clone()));
    let state = api::AppState {
        service,
        config: config.clone(),
    };

    let router = api::router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;

    tracing::info!("Listening on {}", config.server.bind);
    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
