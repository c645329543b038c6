//! Fulfillment error types.

use docflow_shared::types::LineItemId;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::document::{DocumentStatus, DocumentType};

/// Errors raised while allocating or releasing delivered quantities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FulfillmentError {
    /// The request names no lines.
    #[error("Allocation must name at least one line item")]
    EmptyAllocation,

    /// The line is not on the document.
    #[error("Line item {line_item_id} is not on this document")]
    UnknownLineItem {
        /// The unknown line.
        line_item_id: LineItemId,
    },

    /// Quantities must be positive.
    #[error("Invalid delivery_quantity {quantity} for line item {line_item_id}: must be greater than zero")]
    InvalidQuantity {
        /// The line.
        line_item_id: LineItemId,
        /// The requested quantity.
        quantity: Decimal,
    },

    /// Requests for one line add up past the representable range.
    #[error("Requested quantities for line item {line_item_id} are too large")]
    QuantityTooLarge {
        /// The line.
        line_item_id: LineItemId,
    },

    /// More was requested than remains undelivered.
    #[error("Requested {requested} of line item {line_item_id} but only {remaining} remains")]
    OverAllocation {
        /// The line.
        line_item_id: LineItemId,
        /// Total requested for the line in this call.
        requested: Decimal,
        /// Quantity still remaining.
        remaining: Decimal,
    },

    /// Deliveries are only recorded on approved delivery notes.
    #[error("Cannot record deliveries on a {document_type} in status {status}")]
    NotDeliverable {
        /// Type of the target document.
        document_type: DocumentType,
        /// Its status.
        status: DocumentStatus,
    },

    /// Returning more than was taken.
    #[error("Cannot release {requested} of line item {line_item_id}; only {delivered} was allocated")]
    ReleaseExceedsDelivered {
        /// The line.
        line_item_id: LineItemId,
        /// Quantity to give back.
        requested: Decimal,
        /// Quantity currently allocated.
        delivered: Decimal,
    },
}

impl FulfillmentError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::EmptyAllocation
            | Self::UnknownLineItem { .. }
            | Self::InvalidQuantity { .. }
            | Self::QuantityTooLarge { .. } => 400,
            Self::OverAllocation { .. } => 422,
            Self::NotDeliverable { .. } | Self::ReleaseExceedsDelivered { .. } => 409,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyAllocation
            | Self::UnknownLineItem { .. }
            | Self::InvalidQuantity { .. }
            | Self::QuantityTooLarge { .. } => "VALIDATION_ERROR",
            Self::OverAllocation { .. } => "OVER_ALLOCATION",
            Self::NotDeliverable { .. } => "SOURCE_NOT_ELIGIBLE",
            Self::ReleaseExceedsDelivered { .. } => "RELEASE_EXCEEDS_DELIVERED",
        }
    }
}
