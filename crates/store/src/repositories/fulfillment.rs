//! Fulfillment repository: delivery recording and progress reports.

use docflow_core::calculation::CalculationError;
use docflow_core::context::OperationContext;
use docflow_core::document::{DocumentType, DocumentView};
use docflow_core::fulfillment::{DeliveryAllocation, FulfillmentReport, FulfillmentTracker};
use docflow_core::EngineResult;
use docflow_shared::types::DocumentId;
use tracing::{info, warn};

use crate::Store;

/// Fulfillment repository.
#[derive(Debug, Clone)]
pub struct FulfillmentRepository {
    store: Store,
}

impl FulfillmentRepository {
    /// Creates a new fulfillment repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Records goods handed over on an approved delivery note.
    ///
    /// A fully delivered note completes, and may in turn complete its receipt.
    ///
    /// # Errors
    ///
    /// `NotDeliverable`, `OverAllocation` or a validation error.
    pub async fn record_delivery(
        &self,
        delivery_note_id: DocumentId,
        deliveries: &[DeliveryAllocation],
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let mut note = state.document(delivery_note_id)?.clone();
        FulfillmentTracker::record_delivery(&mut note, deliveries).inspect_err(|err| {
            warn!(document_id = %delivery_note_id, error = %err, "Delivery recording refused");
        })?;
        note.updated_at = ctx.now;

        info!(
            document_id = %delivery_note_id,
            delivered = %note.delivered_quantity(),
            total = %note.total_quantity(),
            "Delivery recorded"
        );
        state.put_document(note);
        state.settle(delivery_note_id, ctx)?;

        let note = state.document(delivery_note_id)?;
        Ok(state.view(note, ctx))
    }

    /// Per-line and aggregate delivery progress of a receipt or delivery note.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound`, or a validation error for other document types.
    pub async fn report(&self, id: DocumentId) -> EngineResult<FulfillmentReport> {
        let state = self.store.lock().await;

        let document = state.document(id)?;
        match document.document_type {
            DocumentType::Receipt | DocumentType::DeliveryNote => {
                Ok(FulfillmentTracker::report(document))
            }
            other => Err(CalculationError::invalid(
                "document_type",
                format!("{other} documents are not fulfilled"),
            )
            .into()),
        }
    }
}
