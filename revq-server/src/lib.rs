//! revq-server library - review work routing service
//!
//! The surrounding deployment owns reviewer authentication and the review
//! UI; this service owns the item lifecycle: leasing pending items to
//! reviewers, recording decisions, and releasing abandoned leases.

use axum::Router;
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod db;
pub mod export;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Directory where decision results are exported
    pub export_dir: PathBuf,
    /// Default lease age for the stale-lock reset endpoint
    pub stale_lock_minutes: i64,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, export_dir: PathBuf, stale_lock_minutes: i64) -> Self {
        Self {
            db,
            export_dir,
            stale_lock_minutes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/api/items/next", get(api::items::next_item))
        .route("/api/items/:item_id", get(api::items::get_item))
        .route("/api/items/:item_id/decisions", get(api::items::item_decisions))
        .route("/api/decisions", post(api::decisions::submit_decision))
        .route("/api/unlock/:item_id", post(api::admin::unlock_item))
        .route("/api/unlock-all", post(api::admin::unlock_all))
        .route("/api/reset-stale-locks", post(api::admin::reset_stale_locks))
        .route("/api/requeue-escalated", post(api::admin::requeue_escalated))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
