//! Property-based tests for FulfillmentTracker.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::calculation::{Discount, LineItemInput, TotalsParams};
use crate::context::OperationContext;
use crate::document::{Document, DocumentSpec, DocumentType, LineItem, LineItemDraft};
use crate::fulfillment::error::FulfillmentError;
use crate::fulfillment::tracker::{DeliveryAllocation, FulfillmentTracker};
use docflow_shared::types::{CustomerId, UserId};

fn receipt(quantities: &[i64]) -> Document {
    let lines = quantities
        .iter()
        .map(|q| {
            LineItem::from_draft(&LineItemDraft {
                source_reference: None,
                description: String::new(),
                unit: String::new(),
                pricing: LineItemInput {
                    quantity: Decimal::from(*q),
                    unit_price: Decimal::ONE,
                    discount: Discount::default(),
                },
            })
            .unwrap()
        })
        .collect();
    Document::draft(
        DocumentSpec {
            document_type: DocumentType::Receipt,
            document_number: "RC-1".to_string(),
            customer_id: CustomerId::new(),
            line_items: lines,
            params: TotalsParams::default(),
            parent_links: vec![],
            notes: None,
        },
        &OperationContext::new(UserId::new()),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Across any sequence of requests, Σ allocated per line never exceeds its
    /// quantity, remaining never goes negative, and failures change nothing.
    #[test]
    fn prop_allocations_never_exceed_quantity(
        quantities in prop::collection::vec(1i64..200, 1..4),
        requests in prop::collection::vec(
            prop::collection::vec((0usize..4, 1i64..120), 1..4),
            1..10,
        ),
    ) {
        let mut doc = receipt(&quantities);
        let mut allocated = vec![Decimal::ZERO; quantities.len()];

        for request in requests {
            let allocations: Vec<DeliveryAllocation> = request
                .iter()
                .map(|(index, qty)| DeliveryAllocation {
                    line_item_id: doc.line_items[index % quantities.len()].id,
                    delivery_quantity: Decimal::from(*qty),
                })
                .collect();

            let before = doc.clone();
            match FulfillmentTracker::allocate(&mut doc, &allocations) {
                Ok(plan) => {
                    for entry in plan {
                        let index = doc.line_items.iter().position(|l| l.id == entry.line_item_id).unwrap();
                        allocated[index] += entry.delivery_quantity;
                    }
                }
                Err(FulfillmentError::OverAllocation { .. }) => prop_assert_eq!(&doc, &before),
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }

            for (index, line) in doc.line_items.iter().enumerate() {
                prop_assert!(line.quantity_remaining >= Decimal::ZERO);
                prop_assert!(allocated[index] <= line.quantity());
                prop_assert_eq!(line.delivered_quantity(), allocated[index]);
            }
        }
    }
}
