//! Money arithmetic helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every monetary figure in Docflow is a `rust_decimal::Decimal` rounded
//! with banker's rounding (round half to even) to `MONEY_SCALE` places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Decimal places kept for derived percentages.
pub const PERCENT_SCALE: u32 = 4;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a monetary amount to `MONEY_SCALE` places.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a derived percentage to `PERCENT_SCALE` places.
#[must_use]
pub fn round_percent(percent: Decimal) -> Decimal {
    percent.round_dp_with_strategy(PERCENT_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Returns `percent` % of `base`, rounded as money.
///
/// `None` if the product does not fit in a `Decimal`.
#[must_use]
pub fn percent_of(base: Decimal, percent: Decimal) -> Option<Decimal> {
    base.checked_mul(percent)?
        .checked_div(HUNDRED)
        .map(round_money)
}

/// Expresses `part` as a percentage of `whole`.
///
/// A non-positive `whole` yields zero rather than a division error; `None`
/// if the ratio does not fit in a `Decimal`.
#[must_use]
pub fn ratio_as_percent(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    part.checked_div(whole)?
        .checked_mul(HUNDRED)
        .map(round_percent)
}
