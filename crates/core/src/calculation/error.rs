//! Calculation error types.
//!
//! Calculations fail fast on the first violated rule. Out-of-range input is
//! never clamped.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while pricing line items or aggregating document totals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalculationError {
    /// A field is outside its permitted range.
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// The offending field, e.g. `quantity` or `line_items[2].discount_percent`.
        field: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// The deposit is larger than the document total.
    #[error("Deposit {deposit_amount} exceeds document total {total_amount}")]
    DepositExceedsTotal {
        /// The derived or entered deposit amount.
        deposit_amount: Decimal,
        /// The document total (subtotal plus tax).
        total_amount: Decimal,
    },
}

impl CalculationError {
    /// Builds a `Validation` error for `field`.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Builds a `Validation` error for a figure too large to represent.
    pub fn overflow(field: impl Into<String>) -> Self {
        Self::invalid(field, "value is too large to calculate")
    }

    /// Prefixes a validation field with the index of the line that produced it.
    #[must_use]
    pub fn at_line(self, index: usize) -> Self {
        match self {
            Self::Validation { field, reason } => Self::Validation {
                field: format!("line_items[{index}].{field}"),
                reason,
            },
            other => other,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::DepositExceedsTotal { .. } => 422,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DepositExceedsTotal { .. } => "DEPOSIT_EXCEEDS_TOTAL",
        }
    }
}
