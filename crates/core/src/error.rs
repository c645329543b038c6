//! Engine-wide error type.
//!
//! Each module keeps its own error enum; `EngineError` unifies them for
//! callers that run whole operations.

use docflow_shared::types::{DocumentId, PricingRequestId};
use thiserror::Error;

use crate::calculation::CalculationError;
use crate::conversion::ConversionError;
use crate::fulfillment::FulfillmentError;
use crate::lifecycle::LifecycleError;

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Any failure of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Pricing or totals validation.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// Status transition refused.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// Conversion refused.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// Quantity accounting refused.
    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),

    /// No document with this id.
    #[error("Document {0} not found")]
    DocumentNotFound(DocumentId),

    /// No pricing request with this id.
    #[error("Pricing request {0} not found")]
    PricingRequestNotFound(PricingRequestId),

    /// An idempotency key was reused for a different request.
    #[error("Idempotency key {key} was already used for a different request")]
    IdempotencyConflict {
        /// The reused key.
        key: String,
    },
}

impl EngineError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Calculation(err) => err.status_code(),
            Self::Lifecycle(err) => err.status_code(),
            Self::Conversion(err) => err.status_code(),
            Self::Fulfillment(err) => err.status_code(),
            Self::DocumentNotFound(_) | Self::PricingRequestNotFound(_) => 404,
            Self::IdempotencyConflict { .. } => 409,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Calculation(err) => err.error_code(),
            Self::Lifecycle(err) => err.error_code(),
            Self::Conversion(err) => err.error_code(),
            Self::Fulfillment(err) => err.error_code(),
            Self::DocumentNotFound(_) | Self::PricingRequestNotFound(_) => "NOT_FOUND",
            Self::IdempotencyConflict { .. } => "IDEMPOTENCY_CONFLICT",
        }
    }
}
