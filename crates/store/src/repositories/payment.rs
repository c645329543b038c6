//! Payment repository.
//!
//! Stands in for the payment collaborator: it keeps the cumulative amount
//! paid per invoice, from which payment overlays and receipt eligibility
//! are derived.

use docflow_core::calculation::CalculationError;
use docflow_core::context::OperationContext;
use docflow_core::conversion::ConversionError;
use docflow_core::document::{DocumentStatus, DocumentType, PaymentStatus};
use docflow_core::EngineResult;
use docflow_shared::types::DocumentId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Store;

/// Payment position of one invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// The invoice.
    pub invoice_id: DocumentId,
    /// Cumulative amount paid.
    pub amount_paid: Decimal,
    /// Overlay derived from `amount_paid` and the invoice net amount.
    pub payment_status: PaymentStatus,
    /// Net amount still unpaid.
    pub balance_due: Decimal,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    store: Store,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Adds a payment against an approved invoice.
    ///
    /// # Errors
    ///
    /// - `SourceNotEligible` unless the document is an approved or completed invoice
    /// - a validation error for a non-positive amount or one that would take
    ///   the cumulative total past the invoice net amount
    pub async fn record_payment(
        &self,
        invoice_id: DocumentId,
        amount: Decimal,
        ctx: &OperationContext,
    ) -> EngineResult<PaymentRecord> {
        let mut state = self.store.lock().await;

        let invoice = state.document(invoice_id)?;
        let subject = format!("{} {}", invoice.document_type, invoice.document_number);
        if invoice.document_type != DocumentType::Invoice {
            return Err(ConversionError::not_eligible(subject, "payments apply to invoices").into());
        }
        if !matches!(
            invoice.status,
            DocumentStatus::Approved | DocumentStatus::Completed
        ) {
            warn!(document_id = %invoice_id, status = %invoice.status, "Payment refused");
            return Err(ConversionError::not_eligible(
                subject,
                format!("status is {}, expected approved", invoice.status),
            )
            .into());
        }
        if amount <= Decimal::ZERO {
            return Err(CalculationError::invalid("amount", "must be greater than zero").into());
        }

        let net_amount = invoice.totals.net_amount;
        let already_paid = state.amount_paid(invoice_id);
        let Some(amount_paid) = already_paid
            .checked_add(amount)
            .filter(|total| *total <= net_amount)
        else {
            warn!(document_id = %invoice_id, %already_paid, %amount, %net_amount, "Overpayment refused");
            return Err(CalculationError::invalid(
                "amount",
                format!("{amount} on top of {already_paid} paid would exceed net amount {net_amount}"),
            )
            .into());
        };

        state.set_amount_paid(invoice_id, amount_paid);
        info!(
            document_id = %invoice_id,
            %amount,
            %amount_paid,
            actor = %ctx.actor,
            "Payment recorded"
        );
        Ok(record(invoice_id, amount_paid, net_amount))
    }

    /// Current payment position of an invoice.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, or a validation error for other document types.
    pub async fn get(&self, invoice_id: DocumentId) -> EngineResult<PaymentRecord> {
        let state = self.store.lock().await;

        let invoice = state.document(invoice_id)?;
        if invoice.document_type != DocumentType::Invoice {
            return Err(CalculationError::invalid(
                "document_type",
                format!("{} documents carry no payments", invoice.document_type),
            )
            .into());
        }
        Ok(record(
            invoice_id,
            state.amount_paid(invoice_id),
            invoice.totals.net_amount,
        ))
    }
}

fn record(invoice_id: DocumentId, amount_paid: Decimal, net_amount: Decimal) -> PaymentRecord {
    PaymentRecord {
        invoice_id,
        amount_paid,
        payment_status: PaymentStatus::from_amounts(amount_paid, net_amount),
        balance_due: (net_amount - amount_paid).max(Decimal::ZERO),
    }
}
