//! # colloquy-server
//!
//! HTTP server for the Colloquy comment engine.
//!
//! This binary provides:
//! - **Threaded comments** on published posts, nested to arbitrary depth
//! - **Moderation** (pending/approved/rejected/spam) with admin-only
//!   status changes and deletes
//! - **Anonymous and registered authorship** with different validation
//!   and initial-status rules
//! - **REST API** (axum) over a local SQLite store

mod api;
mod config;
mod counter;
mod error;
mod identity;
mod projection;
mod service;
mod tree;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use colloquy_store::Database;

use crate::api::AppState;
use crate::config::ServerConfig;
use crate::service::CommentService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,colloquy_server=debug")),
        )
        .init();

    info!("Starting Colloquy server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");
    info!(
        instance = %config.instance_name,
        admin_enabled = config.admin_token.is_some(),
        "Instance settings"
    );

    // -----------------------------------------------------------------------
    // 3. Open the store and build the service
    // -----------------------------------------------------------------------
    let db = match &config.db_path {
        Some(path) => Database::open_at(path)?,
        None => Database::new()?,
    };

    let state = AppState {
        service: Arc::new(CommentService::new(db)),
        config: Arc::new(config.clone()),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(state, config.http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
