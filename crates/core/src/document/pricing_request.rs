//! Pricing requests: the upstream input merged into quotations.
//!
//! A request is raised for a customer, priced by whoever owns costing, and
//! then consumed by at most one quotation.

use chrono::{DateTime, Utc};
use docflow_shared::types::{CustomerId, DocumentId, PricingRequestId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calculation::CalculationError;
use crate::context::OperationContext;

/// Pricing request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingRequestStatus {
    /// Waiting for a price.
    Requested,
    /// Priced; eligible for conversion into a quotation.
    Priced,
}

impl PricingRequestStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Priced => "priced",
        }
    }
}

impl fmt::Display for PricingRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content of a new pricing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPricingRequest {
    /// Requesting customer.
    pub customer_id: CustomerId,
    /// Catalog product, if one was identified.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// What is being priced.
    pub description: String,
    /// Requested quantity.
    pub quantity: Decimal,
    /// Display unit label.
    #[serde(default)]
    pub unit: String,
}

/// A request to price a product for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRequest {
    /// Request identifier.
    pub id: PricingRequestId,
    /// Human-readable number, e.g. `PR-000007`.
    pub request_number: String,
    /// Requesting customer.
    pub customer_id: CustomerId,
    /// Catalog product, if one was identified.
    pub product_id: Option<ProductId>,
    /// What is being priced.
    pub description: String,
    /// Requested quantity.
    pub quantity: Decimal,
    /// Display unit label.
    pub unit: String,
    /// Suggested unit price once priced.
    pub suggested_unit_price: Option<Decimal>,
    /// Current status.
    pub status: PricingRequestStatus,
    /// Quotation this request was merged into.
    pub quotation_id: Option<DocumentId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl PricingRequest {
    /// Creates a request in `Requested` status.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the quantity is not positive.
    pub fn new(
        input: NewPricingRequest,
        request_number: String,
        ctx: &OperationContext,
    ) -> Result<Self, CalculationError> {
        if input.quantity <= Decimal::ZERO {
            return Err(CalculationError::invalid(
                "quantity",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            id: PricingRequestId::new(),
            request_number,
            customer_id: input.customer_id,
            product_id: input.product_id,
            description: input.description,
            quantity: input.quantity,
            unit: input.unit,
            suggested_unit_price: None,
            status: PricingRequestStatus::Requested,
            quotation_id: None,
            created_at: ctx.now,
            updated_at: ctx.now,
        })
    }

    /// Returns true if the request was already merged into a quotation.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.quotation_id.is_some()
    }

    /// Marks the request consumed by `quotation_id`.
    pub fn link(&mut self, quotation_id: DocumentId, ctx: &OperationContext) {
        self.quotation_id = Some(quotation_id);
        self.updated_at = ctx.now;
    }

    /// Frees the request for another quotation.
    pub fn unlink(&mut self, ctx: &OperationContext) {
        self.quotation_id = None;
        self.updated_at = ctx.now;
    }

    /// Records the suggested unit price and marks the request priced.
    ///
    /// An unlinked priced request may be re-priced.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a negative price or an already linked
    /// request.
    pub fn price(
        &mut self,
        unit_price: Decimal,
        ctx: &OperationContext,
    ) -> Result<(), CalculationError> {
        if unit_price < Decimal::ZERO {
            return Err(CalculationError::invalid(
                "unit_price",
                "must not be negative",
            ));
        }
        if self.is_linked() {
            return Err(CalculationError::invalid(
                "status",
                format!(
                    "pricing request {} can no longer be priced",
                    self.request_number
                ),
            ));
        }

        self.suggested_unit_price = Some(unit_price);
        self.status = PricingRequestStatus::Priced;
        self.updated_at = ctx.now;
        Ok(())
    }
}
