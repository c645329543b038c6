//! Monetary calculation for documents.
//!
//! # Modules
//!
//! - `line_item` - Per-line discount and total math
//! - `totals` - Document aggregation with VAT, withholding tax and deposit
//! - `error` - Calculation error types

pub mod error;
pub mod line_item;
pub mod totals;

#[cfg(test)]
mod props;

pub use error::CalculationError;
pub use line_item::{Discount, LineItemCalculator, LineItemInput, PricedLine};
pub use totals::{Deposit, DocumentTotals, TotalsCalculation, TotalsCalculator, TotalsParams};
