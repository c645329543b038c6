//! Fulfillment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use docflow_core::fulfillment::DeliveryAllocation;
use docflow_shared::types::DocumentId;
use docflow_store::FulfillmentRepository;
use serde::Deserialize;

use crate::{AppState, error::engine_error_response, middleware::Actor};

/// Creates the fulfillment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/delivery-notes/{id}/deliveries", post(record_delivery))
        .route("/documents/{id}/fulfillment", get(fulfillment_report))
}

/// Request body for recording a delivery.
#[derive(Debug, Deserialize)]
pub struct RecordDeliveryRequest {
    /// Quantities handed over per delivery note line.
    #[serde(default)]
    pub deliveries: Vec<DeliveryAllocation>,
}

/// POST `/delivery-notes/{id}/deliveries` - Confirm goods handed over.
async fn record_delivery(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
    Json(payload): Json<RecordDeliveryRequest>,
) -> impl IntoResponse {
    let repo = FulfillmentRepository::new(state.store.clone());
    match repo
        .record_delivery(id, &payload.deliveries, actor.context())
        .await
    {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// GET `/documents/{id}/fulfillment` - Delivery progress of a receipt or note.
async fn fulfillment_report(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = FulfillmentRepository::new(state.store.clone());
    match repo.report(id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}
