//! Conversion routes: each creates the next document of the pipeline.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use docflow_core::conversion::QuotationTerms;
use docflow_core::fulfillment::DeliveryAllocation;
use docflow_shared::AppError;
use docflow_shared::types::{DocumentId, PricingRequestId};
use docflow_store::ConversionRepository;
use serde::Deserialize;

use crate::{
    AppState,
    error::{app_error_response, engine_error_response},
    middleware::Actor,
};

/// Header carrying the caller's idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

/// Creates the conversion routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/quotations/from-pricing-requests",
            post(convert_pricing_to_quotation),
        )
        .route("/quotations/{id}/invoice", post(convert_quotation_to_invoice))
        .route("/invoices/{id}/receipt", post(convert_invoice_to_receipt))
        .route("/receipts/{id}/delivery-notes", post(convert_receipt_to_delivery))
}

/// Request body for merging pricing requests.
#[derive(Debug, Deserialize)]
pub struct FromPricingRequestsRequest {
    /// Requests to merge.
    #[serde(default)]
    pub pricing_request_ids: Vec<PricingRequestId>,
    /// Tax, deposit, expiry and remarks.
    #[serde(flatten)]
    pub terms: QuotationTerms,
}

/// Request body for a delivery note.
#[derive(Debug, Deserialize)]
pub struct DeliveryRequest {
    /// Quantities per receipt line.
    #[serde(default)]
    pub allocations: Vec<DeliveryAllocation>,
}

/// POST `/quotations/from-pricing-requests` - Merge priced requests into a quotation.
async fn convert_pricing_to_quotation(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<FromPricingRequestsRequest>,
) -> impl IntoResponse {
    let repo = ConversionRepository::new(state.store.clone());
    match repo
        .pricing_to_quotation(&payload.pricing_request_ids, payload.terms, actor.context())
        .await
    {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/quotations/{id}/invoice` - Invoice an approved quotation.
async fn convert_quotation_to_invoice(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = ConversionRepository::new(state.store.clone());
    match repo.quotation_to_invoice(id, actor.context()).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/invoices/{id}/receipt` - Issue a receipt for a paid invoice.
async fn convert_invoice_to_receipt(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
) -> impl IntoResponse {
    let repo = ConversionRepository::new(state.store.clone());
    match repo.invoice_to_receipt(id, actor.context()).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}

/// POST `/receipts/{id}/delivery-notes` - Ship part of a receipt.
///
/// An `Idempotency-Key` header makes retries safe.
async fn convert_receipt_to_delivery(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<DocumentId>,
    headers: HeaderMap,
    Json(payload): Json<DeliveryRequest>,
) -> impl IntoResponse {
    let key = match headers.get(IDEMPOTENCY_KEY_HEADER).map(|v| v.to_str()) {
        None => None,
        Some(Ok(key)) if !key.trim().is_empty() => Some(key.trim()),
        Some(_) => {
            return app_error_response(&AppError::Validation(
                "Idempotency-Key must be a non-empty ASCII string".to_string(),
            ));
        }
    };

    let repo = ConversionRepository::new(state.store.clone());
    match repo
        .receipt_to_delivery(id, &payload.allocations, key, actor.context())
        .await
    {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => engine_error_response(&e),
    }
}
