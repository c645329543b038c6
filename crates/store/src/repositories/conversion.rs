//! Conversion repository: moves work down the sales pipeline.

use docflow_core::context::OperationContext;
use docflow_core::conversion::{ConversionService, QuotationTerms};
use docflow_core::document::{DocumentType, DocumentView};
use docflow_core::fulfillment::DeliveryAllocation;
use docflow_core::{EngineError, EngineResult};
use docflow_shared::types::{DocumentId, PricingRequestId};
use tracing::{info, warn};

use crate::Store;
use crate::state::DeliveryRecord;

/// Conversion repository.
#[derive(Debug, Clone)]
pub struct ConversionRepository {
    store: Store,
}

impl ConversionRepository {
    /// Creates a new conversion repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Merges priced pricing requests into a new draft quotation and links
    /// every request to it.
    ///
    /// # Errors
    ///
    /// `PricingRequestNotFound`, then the conversion checks in their
    /// documented order.
    pub async fn pricing_to_quotation(
        &self,
        request_ids: &[PricingRequestId],
        terms: QuotationTerms,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let requests = request_ids
            .iter()
            .map(|id| state.pricing_request(*id).cloned())
            .collect::<EngineResult<Vec<_>>>()?;

        let quotation = ConversionService::quotation_from_pricing_requests(
            &requests,
            terms,
            state.next_document_number(DocumentType::Quotation),
            self.store.engine(),
            ctx,
        )
        .inspect_err(|err| warn!(error = %err, "Pricing request conversion refused"))?;

        for mut request in requests {
            request.link(quotation.id, ctx);
            state.put_pricing_request(request);
        }

        info!(
            document_id = %quotation.id,
            document_number = %quotation.document_number,
            request_count = request_ids.len(),
            "Quotation created from pricing requests"
        );
        let view = state.view(&quotation, ctx);
        state.insert_document(quotation);
        Ok(view)
    }

    /// Converts an approved quotation into a draft invoice.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, `SourceNotEligible` or `AlreadyConverted`.
    pub async fn quotation_to_invoice(
        &self,
        quotation_id: DocumentId,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let quotation = state.document(quotation_id)?;
        let invoice = ConversionService::invoice_from_quotation(
            quotation,
            state.live_child(quotation_id, DocumentType::Invoice),
            state.next_document_number(DocumentType::Invoice),
            self.store.engine(),
            ctx,
        )
        .inspect_err(|err| {
            warn!(document_id = %quotation_id, error = %err, "Invoice conversion refused");
        })?;

        info!(
            document_id = %invoice.id,
            quotation_id = %quotation_id,
            document_number = %invoice.document_number,
            "Invoice created from quotation"
        );
        let view = state.view(&invoice, ctx);
        state.insert_document(invoice);
        Ok(view)
    }

    /// Converts an approved invoice with a recorded payment into a draft
    /// receipt.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, `SourceNotEligible` or `AlreadyConverted`.
    pub async fn invoice_to_receipt(
        &self,
        invoice_id: DocumentId,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let invoice = state.document(invoice_id)?;
        let receipt = ConversionService::receipt_from_invoice(
            invoice,
            state.live_child(invoice_id, DocumentType::Receipt),
            state.amount_paid(invoice_id),
            state.next_document_number(DocumentType::Receipt),
            ctx,
        )
        .inspect_err(|err| {
            warn!(document_id = %invoice_id, error = %err, "Receipt conversion refused");
        })?;

        info!(
            document_id = %receipt.id,
            invoice_id = %invoice_id,
            document_number = %receipt.document_number,
            "Receipt created from invoice"
        );
        let view = state.view(&receipt, ctx);
        state.insert_document(receipt);
        Ok(view)
    }

    /// Creates a draft delivery note for part of an approved receipt.
    ///
    /// With an idempotency key, repeating the same request returns the note
    /// created the first time instead of allocating again.
    /// The key stays bound to that note until the note's draft is deleted.
    ///
    /// # Errors
    ///
    /// - `IdempotencyConflict` if the key was used for a different request
    /// - `SourceNotEligible` unless the receipt is approved
    /// - `OverAllocation` or a validation error for a bad request
    pub async fn receipt_to_delivery(
        &self,
        receipt_id: DocumentId,
        allocations: &[DeliveryAllocation],
        idempotency_key: Option<&str>,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        if let Some(key) = idempotency_key
            && let Some(record) = state.delivery_record(key)
        {
            if record.receipt_id != receipt_id || record.allocations != allocations {
                warn!(idempotency_key = key, "Idempotency key reused with another request");
                return Err(EngineError::IdempotencyConflict {
                    key: key.to_string(),
                });
            }
            info!(idempotency_key = key, "Delivery request replayed");
            let note = state.document(record.delivery_note_id)?;
            return Ok(state.view(note, ctx));
        }

        let mut receipt = state.document(receipt_id)?.clone();
        let note = ConversionService::delivery_from_receipt(
            &mut receipt,
            allocations,
            state.next_document_number(DocumentType::DeliveryNote),
            ctx,
        )
        .inspect_err(|err| {
            warn!(document_id = %receipt_id, error = %err, "Delivery conversion refused");
        })?;

        if let Some(key) = idempotency_key {
            state.insert_delivery_record(
                key.to_string(),
                DeliveryRecord {
                    receipt_id,
                    allocations: allocations.to_vec(),
                    delivery_note_id: note.id,
                },
            );
        }
        info!(
            document_id = %note.id,
            receipt_id = %receipt_id,
            document_number = %note.document_number,
            "Delivery note created from receipt"
        );
        state.put_document(receipt);
        let view = state.view(&note, ctx);
        state.insert_document(note);
        Ok(view)
    }
}
