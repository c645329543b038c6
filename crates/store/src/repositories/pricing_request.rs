//! Pricing request repository.

use docflow_core::context::OperationContext;
use docflow_core::document::{NewPricingRequest, PricingRequest};
use docflow_core::EngineResult;
use docflow_shared::types::PricingRequestId;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::Store;

/// Pricing request repository.
#[derive(Debug, Clone)]
pub struct PricingRequestRepository {
    store: Store,
}

impl PricingRequestRepository {
    /// Creates a new pricing request repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Records a customer's request for a price.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive quantity.
    pub async fn create(
        &self,
        input: NewPricingRequest,
        ctx: &OperationContext,
    ) -> EngineResult<PricingRequest> {
        let mut state = self.store.lock().await;

        let request = PricingRequest::new(input, state.next_pricing_request_number(), ctx)
            .inspect_err(|err| warn!(error = %err, "Pricing request refused"))?;

        info!(
            pricing_request_id = %request.id,
            request_number = %request.request_number,
            customer_id = %request.customer_id,
            "Pricing request created"
        );
        state.insert_pricing_request(request.clone());
        Ok(request)
    }

    /// Fetches a pricing request.
    ///
    /// # Errors
    ///
    /// `PricingRequestNotFound`.
    pub async fn get(&self, id: PricingRequestId) -> EngineResult<PricingRequest> {
        let state = self.store.lock().await;
        state.pricing_request(id).cloned()
    }

    /// Sets the suggested unit price.
    ///
    /// # Errors
    ///
    /// `PricingRequestNotFound`, or a validation error for a negative price or
    /// a request that can no longer be priced.
    pub async fn price(
        &self,
        id: PricingRequestId,
        unit_price: Decimal,
        ctx: &OperationContext,
    ) -> EngineResult<PricingRequest> {
        let mut state = self.store.lock().await;

        let mut request = state.pricing_request(id)?.clone();
        request
            .price(unit_price, ctx)
            .inspect_err(|err| warn!(pricing_request_id = %id, error = %err, "Pricing refused"))?;

        info!(pricing_request_id = %id, unit_price = %unit_price, "Pricing request priced");
        state.put_pricing_request(request.clone());
        Ok(request)
    }
}
