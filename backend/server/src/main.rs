//! Fund Me ledger server: entry point.
//!
//! Opens the SQLite record store, wraps it in the ledger and serves the
//! Axum REST API for project registration, donations and lookups.

mod api;
mod config;
mod db;
mod errors;

use std::sync::Arc;

use fund_me::{FundMe, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use db::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging (RUST_LOG controls verbosity).
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Load optional .env file (ignored if missing).
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up the SQLite connection pool and run migrations.
    let pool = db::init_pool(&config.database_url, config.max_connections).await?;

    let ledger = FundMe::new(config.program_id, SqliteStore::new(pool), SystemClock);
    info!("Ledger ready under program {}", config.program_id);

    let app = api::router(Arc::new(api::ApiState { ledger }));

    let addr = format!("0.0.0.0:{}", config.api_port);
    info!("API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
