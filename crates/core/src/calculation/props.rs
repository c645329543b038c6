//! Property-based tests for line and document calculations.

use docflow_shared::types::percent_of;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::CalculationError;
use super::line_item::{Discount, LineItemCalculator, LineItemInput};
use super::totals::{Deposit, TotalsCalculator, TotalsParams};

/// Strategy for positive quantities (0.01 to 10,000.00).
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|v| Decimal::new(v, 2))
}

/// Strategy for unit prices (0.00 to 100,000.00).
fn unit_price() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for percentages (0.00 to 100.00).
fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|v| Decimal::new(v, 2))
}

fn discount() -> impl Strategy<Value = Discount> {
    prop_oneof![
        percent().prop_map(Discount::Percent),
        (0i64..100_000i64).prop_map(|cents| Discount::Amount(Decimal::new(cents, 2))),
    ]
}

fn line_input() -> impl Strategy<Value = LineItemInput> {
    (quantity(), unit_price(), discount()).prop_map(|(quantity, unit_price, discount)| {
        LineItemInput {
            quantity,
            unit_price,
            discount,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every accepted line satisfies total = base − discount with 0 ≤ discount ≤ base.
    #[test]
    fn prop_line_total_invariant(input in line_input()) {
        match LineItemCalculator::calculate(&input) {
            Ok(line) => {
                prop_assert_eq!(line.total_amount, line.base_amount - line.discount_amount);
                prop_assert!(line.discount_amount >= Decimal::ZERO);
                prop_assert!(line.discount_amount <= line.base_amount);
            }
            Err(CalculationError::Validation { field, .. }) => {
                // Only an oversized absolute discount can fail with generated input.
                prop_assert_eq!(field, "discount_amount");
                prop_assert!(matches!(input.discount, Discount::Amount(_)));
            }
            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// A percentage discount is always the rounded share of the base amount.
    #[test]
    fn prop_percent_discount_amount(q in quantity(), p in unit_price(), pct in percent()) {
        let line = LineItemCalculator::calculate(&LineItemInput {
            quantity: q,
            unit_price: p,
            discount: Discount::Percent(pct),
        }).unwrap();
        prop_assert_eq!(Some(line.discount_amount), percent_of(line.base_amount, pct));
        prop_assert_eq!(line.discount_percent, pct);
    }

    /// Figures beyond `Decimal` range are refused with a validation error.
    #[test]
    fn prop_oversized_line_is_refused(
        scale_down in 0u32..4,
        factor in 2i64..1_000i64,
        discount in discount(),
    ) {
        let quantity = Decimal::MAX / Decimal::from(10i64.pow(scale_down));
        let unit_price = Decimal::from(factor) * Decimal::from(10i64.pow(scale_down));
        let result = LineItemCalculator::calculate(&LineItemInput { quantity, unit_price, discount });
        let refused = matches!(result, Err(CalculationError::Validation { .. }));
        prop_assert!(refused);
    }

    /// Deposit never exceeds the total on success; otherwise the call fails.
    #[test]
    fn prop_deposit_never_exceeds_total(
        lines in prop::collection::vec(line_input(), 1..6),
        tax in percent(),
        wht in percent(),
        deposit_cents in 0i64..50_000_000i64,
    ) {
        let params = TotalsParams {
            tax_rate: tax,
            wht_rate: wht,
            deposit: Deposit::Amount(Decimal::new(deposit_cents, 2)),
        };
        match TotalsCalculator::calculate(&lines, &params) {
            Ok(result) => prop_assert!(result.totals.deposit_amount <= result.totals.total_amount),
            Err(CalculationError::DepositExceedsTotal { deposit_amount, total_amount }) => {
                prop_assert!(deposit_amount > total_amount);
            }
            Err(CalculationError::Validation { .. }) => {}
        }
    }

    /// Recomputing with identical inputs yields identical outputs.
    #[test]
    fn prop_totals_idempotent(
        lines in prop::collection::vec(line_input(), 0..6),
        tax in percent(),
        wht in percent(),
        deposit_pct in percent(),
    ) {
        let params = TotalsParams {
            tax_rate: tax,
            wht_rate: wht,
            deposit: Deposit::Percent(deposit_pct),
        };
        let first = TotalsCalculator::calculate(&lines, &params);
        let second = TotalsCalculator::calculate(&lines, &params);
        prop_assert_eq!(first.clone(), second);

        if let Ok(result) = first {
            let reaggregated = TotalsCalculator::aggregate(&result.lines, &params).unwrap();
            prop_assert_eq!(reaggregated, result.totals);
            prop_assert_eq!(
                result.totals.net_amount,
                result.totals.total_amount - result.totals.wht_amount
            );
        }
    }
}
