//! Decision submission endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::warn;

use revq_common::models::{Item, NewDecision};

use crate::api::{error_response, ErrorResponse};
use crate::{db, export, AppState};

/// POST /api/decisions
///
/// Records the verdict and returns the finalized item. The result export
/// runs afterwards in a detached task; its failure never reaches the
/// caller because the decision is already committed.
pub async fn submit_decision(
    State(state): State<AppState>,
    Json(request): Json<NewDecision>,
) -> Result<Json<Item>, (StatusCode, Json<ErrorResponse>)> {
    match db::decisions::submit(&state.db, &request).await {
        Ok((item, _decision)) => {
            let pool = state.db.clone();
            let export_dir = state.export_dir.clone();
            tokio::spawn(async move {
                if let Err(e) = export::export_results(&pool, &export_dir).await {
                    warn!("Result export failed: {}", e);
                }
            });

            Ok(Json(item))
        }
        Err(e) => Err(error_response(e)),
    }
}
