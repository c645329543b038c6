//! Conversion inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::TotalsParams;

/// Commercial terms of a new quotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationTerms {
    /// Tax and deposit parameters.
    #[serde(flatten)]
    pub params: TotalsParams,
    /// Expiry; defaults to today plus the configured validity.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// Free-form remarks.
    #[serde(default)]
    pub notes: Option<String>,
}
