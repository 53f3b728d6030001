//! mudlarkd - a small line-oriented MUD server.
//!
//! Accepts plain TCP connections, walks each one through the login state
//! machine (name, account creation, password), and hands authenticated
//! sessions to the in-game command loop.

mod charset;
mod commands;
mod config;
mod db;
mod error;
mod login;
mod messages;
mod network;
mod security;
mod state;

use crate::config::Config;
use crate::db::Database;
use crate::network::{Gateway, Shared};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).map_err(|e| {
            error!(path = %config_path, error = %e, "Failed to load config");
            e
        })?
    } else {
        info!(path = %config_path, "No config file, using defaults");
        Config::default()
    };

    info!(
        server = %config.server.name,
        listen = %config.server.listen,
        "Starting mudlarkd"
    );

    let db = Database::new(&config.database.path).await?;

    let shared = Arc::new(Shared::new(config, db));
    let gateway = Gateway::bind(shared).await?;
    gateway.run().await?;

    info!("Server stopped");
    Ok(())
}
