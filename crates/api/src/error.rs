//! Error to HTTP response mapping.
//!
//! Every failure leaves as `{ "error": CODE, "message": text }` with the
//! status the error itself reports.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docflow_core::EngineError;
use docflow_shared::AppError;
use serde_json::json;
use tracing::error;

/// Builds the JSON error body.
fn error_body(status: u16, code: &str, message: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}

/// Maps engine errors to HTTP responses.
pub fn engine_error_response(e: &EngineError) -> Response {
    error_body(e.status_code(), e.error_code(), e.to_string())
}

/// Maps application errors to HTTP responses.
///
/// Internal details are logged, not returned.
pub fn app_error_response(e: &AppError) -> Response {
    match e {
        AppError::Internal(_) | AppError::Configuration(_) => {
            error!(error = %e, "Request failed");
            error_body(e.status_code(), e.error_code(), "An error occurred".to_string())
        }
        _ => error_body(e.status_code(), e.error_code(), e.to_string()),
    }
}
