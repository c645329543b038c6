//! Stateless calculation endpoints.
//!
//! Price a line or a whole document without storing anything.

use axum::{
    Json, Router,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use docflow_core::EngineError;
use docflow_core::calculation::{LineItemCalculator, LineItemInput, TotalsCalculator, TotalsParams};
use serde::Deserialize;

use crate::{AppState, error::engine_error_response};

/// Creates the calculation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/calculations/line-item", post(calculate_line_item))
        .route("/calculations/document-totals", post(calculate_document_totals))
}

/// Request body for a document totals calculation.
#[derive(Debug, Deserialize)]
pub struct DocumentTotalsRequest {
    /// Raw lines.
    #[serde(default)]
    pub line_items: Vec<LineItemInput>,
    /// Tax and deposit parameters.
    #[serde(flatten)]
    pub params: TotalsParams,
}

/// POST `/calculations/line-item` - Price one line.
async fn calculate_line_item(Json(payload): Json<LineItemInput>) -> impl IntoResponse {
    match LineItemCalculator::calculate(&payload) {
        Ok(line) => (StatusCode::OK, Json(line)).into_response(),
        Err(e) => engine_error_response(&EngineError::from(e)),
    }
}

/// POST `/calculations/document-totals` - Price lines and aggregate them.
async fn calculate_document_totals(
    Json(payload): Json<DocumentTotalsRequest>,
) -> impl IntoResponse {
    match TotalsCalculator::calculate(&payload.line_items, &payload.params) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => engine_error_response(&EngineError::from(e)),
    }
}
