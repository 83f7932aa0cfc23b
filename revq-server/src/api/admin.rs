//! Administrative lease recovery endpoints
//!
//! All operations here are idempotent; calling them repeatedly (or on a
//! schedule, for the stale-lock sweep) is safe.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use revq_common::models::Item;
use revq_common::Error;

use crate::api::{error_response, ErrorResponse};
use crate::{db, AppState};

/// Response for a single released item
#[derive(Debug, Serialize)]
pub struct UnlockResponse {
    pub message: String,
    pub item: Item,
}

/// Response for bulk transitions
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub message: String,
    pub count: u64,
}

/// Query parameters for the stale-lock sweep
#[derive(Debug, Deserialize)]
pub struct StaleLockQuery {
    /// Overrides the configured default lease age
    pub max_age_minutes: Option<i64>,
}

/// POST /api/unlock/:item_id
///
/// Release one leased item back to pending. 404 covers both "no such
/// item" and "not currently leased".
pub async fn unlock_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<UnlockResponse>, (StatusCode, Json<ErrorResponse>)> {
    match db::items::release_one(&state.db, &item_id).await {
        Ok(Some(item)) => Ok(Json(UnlockResponse {
            message: format!("Item {} unlocked", item_id),
            item,
        })),
        Ok(None) => Err(error_response(Error::NotFound(format!(
            "Item not found or not locked: {}",
            item_id
        )))),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/unlock-all
pub async fn unlock_all(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, (StatusCode, Json<ErrorResponse>)> {
    match db::items::release_all(&state.db).await {
        Ok(count) => Ok(Json(CountResponse {
            message: format!("Unlocked {} items", count),
            count,
        })),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/reset-stale-locks
///
/// Releases leases older than the requested (or configured) age. Intended
/// to be called on a recurring schedule by an external supervisor.
pub async fn reset_stale_locks(
    State(state): State<AppState>,
    Query(query): Query<StaleLockQuery>,
) -> Result<Json<CountResponse>, (StatusCode, Json<ErrorResponse>)> {
    let minutes = query.max_age_minutes.unwrap_or(state.stale_lock_minutes);
    if minutes <= 0 {
        return Err(error_response(Error::InvalidInput(format!(
            "max_age_minutes must be positive, got {}",
            minutes
        ))));
    }

    match db::items::release_stale(&state.db, Duration::minutes(minutes)).await {
        Ok(count) => Ok(Json(CountResponse {
            message: format!("Reset {} stale locks", count),
            count,
        })),
        Err(e) => Err(error_response(e)),
    }
}

/// POST /api/requeue-escalated
pub async fn requeue_escalated(
    State(state): State<AppState>,
) -> Result<Json<CountResponse>, (StatusCode, Json<ErrorResponse>)> {
    match db::items::requeue_escalated(&state.db).await {
        Ok(count) => Ok(Json(CountResponse {
            message: format!("Requeued {} escalated items", count),
            count,
        })),
        Err(e) => Err(error_response(e)),
    }
}
