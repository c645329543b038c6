//! Line item pricing.
//!
//! A line keeps exactly one authoritative discount input (`Discount`). The
//! other representation is always derived, so percent and amount can never
//! drift apart.

use docflow_shared::types::{percent_of, ratio_as_percent, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CalculationError;

/// The discount the caller last edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the line's base amount, 0 to 100.
    Percent(Decimal),
    /// Absolute amount taken off the line.
    Amount(Decimal),
}

impl Default for Discount {
    fn default() -> Self {
        Self::Amount(Decimal::ZERO)
    }
}

/// Raw pricing input for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Quantity ordered. Must be positive.
    pub quantity: Decimal,
    /// Price per unit. Must not be negative.
    pub unit_price: Decimal,
    /// Authoritative discount.
    #[serde(default)]
    pub discount: Discount,
}

/// A fully priced line: the input plus every derived figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    /// Quantity ordered.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Authoritative discount input.
    pub discount: Discount,
    /// `quantity × unit_price`, rounded to cents.
    pub base_amount: Decimal,
    /// Discount as a percentage of `base_amount`.
    pub discount_percent: Decimal,
    /// Discount as an absolute amount.
    pub discount_amount: Decimal,
    /// `base_amount − discount_amount`.
    pub total_amount: Decimal,
}

impl PricedLine {
    /// Returns the input this line was priced from.
    #[must_use]
    pub fn input(&self) -> LineItemInput {
        LineItemInput {
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount: self.discount,
        }
    }
}

/// Stateless calculator for single line items.
pub struct LineItemCalculator;

impl LineItemCalculator {
    /// Prices a line from its authoritative inputs.
    ///
    /// # Errors
    ///
    /// Returns `CalculationError::Validation` naming the offending field if
    /// the quantity is not positive, the unit price is negative, the discount
    /// percent is outside `[0, 100]`, the discount amount is negative, the
    /// discount exceeds the base amount, or a figure does not fit in a
    /// `Decimal`.
    pub fn calculate(input: &LineItemInput) -> Result<PricedLine, CalculationError> {
        if input.quantity <= Decimal::ZERO {
            return Err(CalculationError::invalid(
                "quantity",
                "must be greater than zero",
            ));
        }
        if input.unit_price < Decimal::ZERO {
            return Err(CalculationError::invalid(
                "unit_price",
                "must not be negative",
            ));
        }

        let base_amount = input
            .quantity
            .checked_mul(input.unit_price)
            .map(round_money)
            .ok_or_else(|| CalculationError::overflow("quantity"))?;

        let (discount_percent, discount_amount) = match input.discount {
            Discount::Percent(percent) => {
                if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                    return Err(CalculationError::invalid(
                        "discount_percent",
                        "must be between 0 and 100",
                    ));
                }
                let amount = percent_of(base_amount, percent)
                    .ok_or_else(|| CalculationError::overflow("discount_percent"))?;
                (percent, amount)
            }
            Discount::Amount(amount) => {
                if amount < Decimal::ZERO {
                    return Err(CalculationError::invalid(
                        "discount_amount",
                        "must not be negative",
                    ));
                }
                if amount > base_amount {
                    return Err(CalculationError::invalid(
                        "discount_amount",
                        format!("{amount} exceeds line amount {base_amount}"),
                    ));
                }
                let percent = ratio_as_percent(amount, base_amount)
                    .ok_or_else(|| CalculationError::overflow("discount_amount"))?;
                (percent, amount)
            }
        };

        Ok(PricedLine {
            quantity: input.quantity,
            unit_price: input.unit_price,
            discount: input.discount,
            base_amount,
            discount_percent,
            discount_amount,
            total_amount: base_amount - discount_amount,
        })
    }

    /// Reprices a line after its quantity or unit price changed.
    ///
    /// A previously set percentage survives the change and the amount is
    /// recomputed from the new base. A line without a percentage discount
    /// comes out undiscounted.
    ///
    /// # Errors
    ///
    /// Same as [`LineItemCalculator::calculate`].
    pub fn reprice(
        previous: &PricedLine,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<PricedLine, CalculationError> {
        let discount = if previous.discount_percent > Decimal::ZERO {
            Discount::Percent(previous.discount_percent)
        } else {
            Discount::Amount(Decimal::ZERO)
        };

        Self::calculate(&LineItemInput {
            quantity,
            unit_price,
            discount,
        })
    }

    /// Replaces the authoritative discount on an already priced line.
    ///
    /// # Errors
    ///
    /// Same as [`LineItemCalculator::calculate`].
    pub fn rediscount(
        previous: &PricedLine,
        discount: Discount,
    ) -> Result<PricedLine, CalculationError> {
        Self::calculate(&LineItemInput {
            discount,
            ..previous.input()
        })
    }
}
