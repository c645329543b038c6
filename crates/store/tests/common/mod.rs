//! Shared fixtures for store integration tests.

#![allow(dead_code)]

use docflow_core::calculation::{Discount, LineItemInput, TotalsParams};
use docflow_core::context::OperationContext;
use docflow_core::conversion::QuotationTerms;
use docflow_core::document::{DocumentView, LineItemDraft, NewPricingRequest};
use docflow_shared::types::{CustomerId, DocumentId, UserId};
use docflow_store::{
    ConversionRepository, CreateQuotationInput, DocumentRepository, FulfillmentRepository,
    PaymentRepository, PricingRequestRepository, Store,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Every repository over one store.
pub struct Repos {
    pub documents: DocumentRepository,
    pub conversions: ConversionRepository,
    pub fulfillment: FulfillmentRepository,
    pub payments: PaymentRepository,
    pub pricing: PricingRequestRepository,
}

impl Repos {
    pub fn new() -> Self {
        let store = Store::default();
        Self {
            documents: DocumentRepository::new(store.clone()),
            conversions: ConversionRepository::new(store.clone()),
            fulfillment: FulfillmentRepository::new(store.clone()),
            payments: PaymentRepository::new(store.clone()),
            pricing: PricingRequestRepository::new(store),
        }
    }
}

pub fn ctx() -> OperationContext {
    OperationContext::new(UserId::new())
}

pub fn line(quantity: Decimal, unit_price: Decimal, discount: Discount) -> LineItemDraft {
    LineItemDraft {
        source_reference: None,
        description: "Steel bracket".to_string(),
        unit: "pcs".to_string(),
        pricing: LineItemInput {
            quantity,
            unit_price,
            discount,
        },
    }
}

pub fn terms(tax_rate: Decimal, wht_rate: Decimal) -> QuotationTerms {
    QuotationTerms {
        params: TotalsParams {
            tax_rate,
            wht_rate,
            ..TotalsParams::default()
        },
        ..QuotationTerms::default()
    }
}

pub fn pricing_input(customer_id: CustomerId, quantity: Decimal) -> NewPricingRequest {
    NewPricingRequest {
        customer_id,
        product_id: None,
        description: "Custom enclosure".to_string(),
        quantity,
        unit: "pcs".to_string(),
    }
}

/// Submits and approves a draft.
pub async fn approve(repos: &Repos, id: DocumentId, ctx: &OperationContext) -> DocumentView {
    repos.documents.submit(id, ctx).await.unwrap();
    repos.documents.approve(id, None, ctx).await.unwrap()
}

/// Builds an approved receipt for a single line of `quantity` units at 10.00.
pub async fn approved_receipt(repos: &Repos, quantity: Decimal, ctx: &OperationContext) -> DocumentView {
    let quotation = repos
        .documents
        .create_quotation(
            CreateQuotationInput {
                customer_id: CustomerId::new(),
                line_items: vec![line(quantity, dec!(10), Discount::default())],
                terms: QuotationTerms::default(),
            },
            ctx,
        )
        .await
        .unwrap();
    approve(repos, quotation.document.id, ctx).await;

    let invoice = repos
        .conversions
        .quotation_to_invoice(quotation.document.id, ctx)
        .await
        .unwrap();
    approve(repos, invoice.document.id, ctx).await;
    repos
        .payments
        .record_payment(invoice.document.id, invoice.document.totals.net_amount, ctx)
        .await
        .unwrap();

    let receipt = repos
        .conversions
        .invoice_to_receipt(invoice.document.id, ctx)
        .await
        .unwrap();
    approve(repos, receipt.document.id, ctx).await
}
