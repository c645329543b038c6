//! Conversion error types.

use docflow_shared::types::CustomerId;
use thiserror::Error;

use crate::calculation::CalculationError;
use crate::fulfillment::FulfillmentError;

/// Errors raised while turning one document into the next.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The source is the wrong type or in the wrong status.
    #[error("{subject} is not eligible for conversion: {reason}")]
    SourceNotEligible {
        /// Human-readable name of the source, e.g. `quotation QT-000004`.
        subject: String,
        /// What is missing.
        reason: String,
    },

    /// The source already has a live child of the target type.
    #[error("{subject} was already converted into {existing}")]
    AlreadyConverted {
        /// Human-readable name of the source.
        subject: String,
        /// Human-readable name of the existing child.
        existing: String,
    },

    /// Pricing requests for different customers cannot be merged.
    #[error("Pricing requests belong to different customers ({expected} and {found})")]
    CustomerMismatch {
        /// Customer of the first request.
        expected: CustomerId,
        /// The first differing customer.
        found: CustomerId,
    },

    /// Input or derived figures failed validation.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// Quantity accounting failed.
    #[error(transparent)]
    Fulfillment(#[from] FulfillmentError),
}

impl ConversionError {
    /// Builds a `SourceNotEligible` error.
    pub fn not_eligible(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceNotEligible {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::SourceNotEligible { .. } | Self::AlreadyConverted { .. } => 409,
            Self::CustomerMismatch { .. } => 422,
            Self::Calculation(err) => err.status_code(),
            Self::Fulfillment(err) => err.status_code(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SourceNotEligible { .. } => "SOURCE_NOT_ELIGIBLE",
            Self::AlreadyConverted { .. } => "ALREADY_CONVERTED",
            Self::CustomerMismatch { .. } => "CUSTOMER_MISMATCH",
            Self::Calculation(err) => err.error_code(),
            Self::Fulfillment(err) => err.error_code(),
        }
    }
}
