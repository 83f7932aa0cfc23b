//! revq-server - Review work routing service
//!
//! Assigns review items to reviewers one at a time, records their
//! decisions, and recovers leases abandoned mid-review. Item import and
//! reporting dashboards live outside this service; it only exposes the
//! routing operations over HTTP.

use anyhow::Result;
use clap::Parser;
use tracing::info;

use revq_server::config::Config;
use revq_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::parse();

    info!("Starting RevQ server v{}", env!("CARGO_PKG_VERSION"));

    let pool = revq_common::db::init_database(&config.database).await?;
    info!("Database ready: {}", config.database.display());

    let state = AppState::new(pool, config.export_dir.clone(), config.stale_lock_minutes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("revq-server listening on http://{}", config.listen);
    info!("Health check: http://{}/health", config.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
