//! Work assignment and item lookup endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use revq_common::models::{Decision, Item};
use revq_common::Error;

use crate::api::{error_response, ErrorResponse};
use crate::{db, AppState};

/// Query parameters for requesting the next work item
#[derive(Debug, Deserialize)]
pub struct NextItemQuery {
    pub reviewer_id: String,

    /// Optional queue filter; unset means any queue
    pub queue: Option<String>,
}

/// GET /api/items/next
///
/// Returns the reviewer's current lease, or leases the next pending item.
/// 404 means no work is available, not a fault.
pub async fn next_item(
    State(state): State<AppState>,
    Query(query): Query<NextItemQuery>,
) -> Result<Json<Item>, (StatusCode, Json<ErrorResponse>)> {
    match db::items::acquire_next(&state.db, &query.reviewer_id, query.queue.as_deref()).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => {
            info!(reviewer_id = %query.reviewer_id, "No pending items to lease");
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "No more items in queue".to_string(),
                }),
            ))
        }
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/items/:item_id
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<Item>, (StatusCode, Json<ErrorResponse>)> {
    match db::items::get_item(&state.db, &item_id).await {
        Ok(Some(item)) => Ok(Json(item)),
        Ok(None) => Err(error_response(Error::NotFound(format!(
            "Item not found: {}",
            item_id
        )))),
        Err(e) => Err(error_response(e)),
    }
}

/// GET /api/items/:item_id/decisions
///
/// Review history for an item, oldest first.
pub async fn item_decisions(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<Vec<Decision>>, (StatusCode, Json<ErrorResponse>)> {
    match db::items::get_item(&state.db, &item_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Err(error_response(Error::NotFound(format!(
                "Item not found: {}",
                item_id
            ))))
        }
        Err(e) => return Err(error_response(e)),
    }

    match db::decisions::list_for_item(&state.db, &item_id).await {
        Ok(decisions) => Ok(Json(decisions)),
        Err(e) => Err(error_response(e)),
    }
}
