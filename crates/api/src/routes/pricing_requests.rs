//! Pricing request routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use docflow_core::document::NewPricingRequest;
use docflow_shared::types::PricingRequestId;
use docflow_store::PricingRequestRepository;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{AppState, error::engine_error_response, middleware::Actor};

/// Creates the pricing request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pricing-requests", post(create_pricing_request))
        .route("/pricing-requests/{id}", get(get_pricing_request))
        .route("/pricing-requests/{id}/price", post(price_pricing_request))
}

/// Request body for pricing a request.
#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    /// Suggested unit price.
    pub unit_price: Decimal,
}

/// POST `/pricing-requests` - Record a customer's request for a price.
async fn create_pricing_request(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<NewPricingRequest>,
) -> impl IntoResponse {
    let repo = PricingRequestRepository::new(state.store.clone());
    match repo.create(payload, actor.context()).await {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// GET `/pricing-requests/{id}` - Fetch a pricing request.
async fn get_pricing_request(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<PricingRequestId>,
) -> impl IntoResponse {
    let repo = PricingRequestRepository::new(state.store.clone());
    match repo.get(id).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/pricing-requests/{id}/price` - Set the suggested unit price.
async fn price_pricing_request(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<PricingRequestId>,
    Json(payload): Json<PriceRequest>,
) -> impl IntoResponse {
    let repo = PricingRequestRepository::new(state.store.clone());
    match repo.price(id, payload.unit_price, actor.context()).await {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}
