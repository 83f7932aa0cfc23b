//! HTTP API for the review routing service
//!
//! Routes map 1:1 onto the core operations; this layer only translates
//! between HTTP and the store, it holds no state of its own.

pub mod admin;
pub mod decisions;
pub mod health;
pub mod items;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;

use revq_common::Error;

/// JSON error body returned by all endpoints
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a core error onto an HTTP status and JSON body
///
/// `NotFound` and `Conflict` are normal negative results for the caller;
/// everything else is a server fault and gets logged before the 500.
pub(crate) fn error_response(err: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Conflict(_) => StatusCode::CONFLICT,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!("Request failed: {}", err);
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
