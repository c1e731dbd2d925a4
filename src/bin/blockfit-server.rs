// ABOUTME: Server binary wiring configuration, storage, and routes together
// ABOUTME: Boots the workout composition API over SQLite and local media files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Blockfit Server Binary
//!
//! Starts the workout composition API: session-token authentication, SQLite
//! persistence, and local media storage behind a single HTTP port.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use blockfit_server::config::ServerConfig;
use blockfit_server::database::Database;
use blockfit_server::logging::LoggingConfig;
use blockfit_server::resources::ServerResources;
use blockfit_server::routes;
use blockfit_server::storage::LocalMediaStorage;

#[derive(Parser)]
#[command(name = "blockfit-server")]
#[command(about = "Blockfit - composition API for exercises, blocks, and trainings")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration from environment, then apply CLI overrides
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    let mut log_config = LoggingConfig::from_env();
    log_config.level = config.log_level.to_string();
    log_config.init()?;

    info!("Starting Blockfit API server");

    prepare_database_dir(&config.database_url).await?;
    let database = Database::new(&config.database_url).await?;
    info!(url = %config.database_url, "Database ready");

    let media = Arc::new(LocalMediaStorage::new(config.media_root.clone()).await?);
    info!(root = %config.media_root.display(), "Media storage ready");

    let resources = Arc::new(ServerResources::new(
        database,
        media,
        Arc::new(config.clone()),
    ));
    let app = routes::router(&resources);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    display_available_endpoints(config.http_port);
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated with error")
}

/// Make sure the directory holding a file-backed `SQLite` database exists
///
/// `create_if_missing` creates the file but not its parent directory.
async fn prepare_database_dir(database_url: &str) -> Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    if path.contains(":memory:") {
        return Ok(());
    }

    let path = path.strip_prefix("//").unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating database directory {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Resolve when the process receives a shutdown request
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received; draining connections");
}

/// Display the API surface with its port
#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(port: u16) {
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    info!("=== Available API Endpoints ===");
    info!("Sessions:");
    info!("   Register:          POST http://{host}:{port}/register");
    info!("   Login:             POST http://{host}:{port}/login");
    info!("   Logout:            POST http://{host}:{port}/logout");
    info!("Exercises:");
    info!("   Create (multipart): POST http://{host}:{port}/api/v1/exercises/create");
    info!("   List:              POST http://{host}:{port}/api/v1/exercises/list");
    info!("   Get/Update/Delete: GET|POST|DELETE http://{host}:{port}/api/v1/exercises/{{id}}");
    info!("Blocks:");
    info!("   Create:            POST http://{host}:{port}/api/v1/blocks/create");
    info!("   List:              POST http://{host}:{port}/api/v1/blocks/list");
    info!("   Get/Update/Delete: GET|POST|DELETE http://{host}:{port}/api/v1/blocks/{{id}}");
    info!("   Toggle draft:      POST http://{host}:{port}/api/v1/blocks/{{id}}/toggle_draft");
    info!("   Add exercise:      POST http://{host}:{port}/api/v1/blocks/{{id}}/add/exercise/{{exercise_id}}");
    info!("   Remove exercise:   POST http://{host}:{port}/api/v1/blocks/{{id}}/remove/exercise/{{exercise_id}}");
    info!("Trainings:");
    info!("   Create:            POST http://{host}:{port}/api/v1/trainings/create");
    info!("   List:              POST http://{host}:{port}/api/v1/trainings/list");
    info!("   Get/Update/Delete: GET|POST|DELETE http://{host}:{port}/api/v1/trainings/{{id}}");
    info!("   Toggle draft:      POST http://{host}:{port}/api/v1/trainings/{{id}}/toggle_draft");
    info!("   Add block:         POST http://{host}:{port}/api/v1/trainings/{{id}}/add/block/{{block_id}}");
    info!("   Remove block:      POST http://{host}:{port}/api/v1/trainings/{{id}}/remove/block/{{block_id}}");
    info!("Tags:");
    info!("   Create:            POST http://{host}:{port}/api/v1/tags/create");
    info!("   List:              GET  http://{host}:{port}/api/v1/tags/list");
    info!("Monitoring:");
    info!("   Health Check:      GET  http://{host}:{port}/health");
    info!("=== End of Endpoint List ===");
}
