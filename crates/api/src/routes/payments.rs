//! Payment routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use docflow_shared::types::DocumentId;
use docflow_store::PaymentRepository;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{AppState, error::engine_error_response, middleware::Actor};

/// Creates the payment routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/invoices/{id}/payments",
        post(record_payment).get(get_payment),
    )
}

/// Request body for a payment.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Amount paid.
    pub amount: Decimal,
}

/// POST `/invoices/{id}/payments` - Record a payment against an invoice.
async fn record_payment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
    Json(payload): Json<PaymentRequest>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new(state.store.clone());
    match repo.record_payment(id, payload.amount, actor.context()).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// GET `/invoices/{id}/payments` - Current payment position.
async fn get_payment(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = PaymentRepository::new(state.store.clone());
    match repo.get(id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}
