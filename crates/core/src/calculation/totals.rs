//! Document totals aggregation.
//!
//! Order of operations is fixed so results are reproducible:
//! 1. subtotal = Σ line totals (after line discounts)
//! 2. discount_total = Σ line discounts
//! 3. tax = subtotal × tax_rate
//! 4. withholding tax = subtotal × wht_rate (pre-tax base)
//! 5. total = subtotal + tax
//! 6. net = total − withholding tax
//! 7. deposit from the authoritative percent or amount, on `total`
//! 8. remaining = net − deposit

use docflow_shared::types::{percent_of, ratio_as_percent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CalculationError;
use super::line_item::{LineItemCalculator, LineItemInput, PricedLine};

/// The deposit the caller last edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deposit {
    /// Percentage of the document total, 0 to 100.
    Percent(Decimal),
    /// Absolute amount entered directly.
    Amount(Decimal),
}

impl Default for Deposit {
    fn default() -> Self {
        Self::Amount(Decimal::ZERO)
    }
}

/// Document-level tax and deposit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TotalsParams {
    /// VAT rate in percent.
    #[serde(default)]
    pub tax_rate: Decimal,
    /// Withholding tax rate in percent.
    #[serde(default)]
    pub wht_rate: Decimal,
    /// Authoritative deposit input.
    #[serde(default)]
    pub deposit: Deposit,
}

/// Derived monetary figures for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Sum of line discounts.
    pub discount_total: Decimal,
    /// VAT on the subtotal.
    pub tax_amount: Decimal,
    /// Withholding tax on the subtotal.
    pub wht_amount: Decimal,
    /// Subtotal plus VAT.
    pub total_amount: Decimal,
    /// Total minus withholding tax.
    pub net_amount: Decimal,
    /// Deposit as a percentage of `total_amount`.
    pub deposit_percent: Decimal,
    /// Deposit as an absolute amount.
    pub deposit_amount: Decimal,
    /// Net amount still owed after the deposit.
    pub remaining_amount: Decimal,
}

/// Result of pricing raw lines and aggregating them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsCalculation {
    /// Each line with its derived figures, in input order.
    pub lines: Vec<PricedLine>,
    /// Aggregated document figures.
    pub totals: DocumentTotals,
}

/// Stateless calculator for document totals.
pub struct TotalsCalculator;

impl TotalsCalculator {
    /// Prices every raw line and aggregates the result.
    ///
    /// # Errors
    ///
    /// Returns the first line validation failure (with the line index in the
    /// field name) or any error from [`TotalsCalculator::aggregate`].
    pub fn calculate(
        lines: &[LineItemInput],
        params: &TotalsParams,
    ) -> Result<TotalsCalculation, CalculationError> {
        let lines = lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                LineItemCalculator::calculate(line).map_err(|err| err.at_line(index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let totals = Self::aggregate(&lines, params)?;
        Ok(TotalsCalculation { lines, totals })
    }

    /// Aggregates already priced lines.
    ///
    /// An empty slice yields all-zero totals; emptiness only matters when a
    /// document leaves draft.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a rate or deposit percent outside `[0, 100]`,
    /// a negative deposit amount or a sum too large to represent, and
    /// `DepositExceedsTotal` when the deposit is larger than the total.
    pub fn aggregate(
        lines: &[PricedLine],
        params: &TotalsParams,
    ) -> Result<DocumentTotals, CalculationError> {
        validate_rate("tax_rate", params.tax_rate)?;
        validate_rate("wht_rate", params.wht_rate)?;

        checked_sum(lines.iter().map(|l| l.quantity), "quantity")?;
        let subtotal = checked_sum(lines.iter().map(|l| l.total_amount), "subtotal")?;
        let discount_total = checked_sum(lines.iter().map(|l| l.discount_amount), "discount_total")?;

        let tax_amount = percent_of(subtotal, params.tax_rate)
            .ok_or_else(|| CalculationError::overflow("tax_amount"))?;
        // Withholding is taken on the pre-tax subtotal, not on the total.
        let wht_amount = percent_of(subtotal, params.wht_rate)
            .ok_or_else(|| CalculationError::overflow("wht_amount"))?;
        let total_amount = subtotal
            .checked_add(tax_amount)
            .ok_or_else(|| CalculationError::overflow("total_amount"))?;
        let net_amount = total_amount - wht_amount;

        let (deposit_percent, deposit_amount) = match params.deposit {
            Deposit::Percent(percent) => {
                validate_rate("deposit_percent", percent)?;
                let amount = percent_of(total_amount, percent)
                    .ok_or_else(|| CalculationError::overflow("deposit_amount"))?;
                (percent, amount)
            }
            Deposit::Amount(amount) => {
                if amount < Decimal::ZERO {
                    return Err(CalculationError::invalid(
                        "deposit_amount",
                        "must not be negative",
                    ));
                }
                ensure_deposit_within(amount, total_amount)?;
                let percent = ratio_as_percent(amount, total_amount)
                    .ok_or_else(|| CalculationError::overflow("deposit_amount"))?;
                (percent, amount)
            }
        };
        ensure_deposit_within(deposit_amount, total_amount)?;

        Ok(DocumentTotals {
            subtotal,
            discount_total,
            tax_amount,
            wht_amount,
            total_amount,
            net_amount,
            deposit_percent,
            deposit_amount,
            remaining_amount: net_amount - deposit_amount,
        })
    }
}

fn checked_sum(
    mut values: impl Iterator<Item = Decimal>,
    field: &str,
) -> Result<Decimal, CalculationError> {
    values
        .try_fold(Decimal::ZERO, Decimal::checked_add)
        .ok_or_else(|| CalculationError::overflow(field))
}

fn ensure_deposit_within(
    deposit_amount: Decimal,
    total_amount: Decimal,
) -> Result<(), CalculationError> {
    if deposit_amount > total_amount {
        return Err(CalculationError::DepositExceedsTotal {
            deposit_amount,
            total_amount,
        });
    }
    Ok(())
}

fn validate_rate(field: &str, rate: Decimal) -> Result<(), CalculationError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(CalculationError::invalid(field, "must be between 0 and 100"));
    }
    Ok(())
}
