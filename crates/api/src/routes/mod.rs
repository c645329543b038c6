//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod calculations;
pub mod conversions;
pub mod documents;
pub mod fulfillment;
pub mod health;
pub mod payments;
pub mod pricing_requests;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(calculations::routes())
        .merge(pricing_requests::routes())
        .merge(documents::routes())
        .merge(conversions::routes())
        .merge(payments::routes())
        .merge(fulfillment::routes())
}
