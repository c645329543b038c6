//! Store tables and the helpers repositories share.

use std::collections::HashMap;

use docflow_core::context::OperationContext;
use docflow_core::document::{
    Document, DocumentStatus, DocumentType, DocumentView, ParentLink, PricingRequest,
};
use docflow_core::fulfillment::{DeliveryAllocation, FulfillmentTracker};
use docflow_core::lifecycle::LifecycleService;
use docflow_core::{EngineError, EngineResult};
use docflow_shared::types::{DocumentId, PricingRequestId};
use rust_decimal::Decimal;
use tracing::info;

/// A delivery note created under an idempotency key.
///
/// Kept for as long as the note exists; deleting the draft frees the key.
#[derive(Debug, Clone)]
pub(crate) struct DeliveryRecord {
    pub receipt_id: DocumentId,
    pub allocations: Vec<DeliveryAllocation>,
    pub delivery_note_id: DocumentId,
}

/// All tables. Only reachable through [`crate::Store::lock`].
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    documents: HashMap<DocumentId, Document>,
    pricing_requests: HashMap<PricingRequestId, PricingRequest>,
    payments: HashMap<DocumentId, Decimal>,
    children: HashMap<DocumentId, Vec<DocumentId>>,
    deliveries: HashMap<String, DeliveryRecord>,
    document_sequences: HashMap<DocumentType, u64>,
    pricing_sequence: u64,
}

impl StoreState {
    /// Number the next inserted document of `document_type` will carry.
    pub fn next_document_number(&self, document_type: DocumentType) -> String {
        let next = self
            .document_sequences
            .get(&document_type)
            .copied()
            .unwrap_or(0)
            + 1;
        format!("{}-{next:06}", document_type.number_prefix())
    }

    /// Number the next inserted pricing request will carry.
    pub fn next_pricing_request_number(&self) -> String {
        format!("PR-{:06}", self.pricing_sequence + 1)
    }

    pub fn document(&self, id: DocumentId) -> EngineResult<&Document> {
        self.documents
            .get(&id)
            .ok_or(EngineError::DocumentNotFound(id))
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    pub fn pricing_request(&self, id: PricingRequestId) -> EngineResult<&PricingRequest> {
        self.pricing_requests
            .get(&id)
            .ok_or(EngineError::PricingRequestNotFound(id))
    }

    /// Documents converted from `id`, in creation order.
    pub fn children(&self, id: DocumentId) -> Vec<&Document> {
        self.children
            .get(&id)
            .map(|ids| ids.iter().filter_map(|c| self.documents.get(c)).collect())
            .unwrap_or_default()
    }

    /// The non-rejected child of `document_type`, if any.
    pub fn live_child(&self, id: DocumentId, document_type: DocumentType) -> Option<&Document> {
        self.children(id).into_iter().find(|child| {
            child.document_type == document_type && child.status != DocumentStatus::Rejected
        })
    }

    /// Writes a new document and indexes it under its parents.
    pub fn insert_document(&mut self, document: Document) {
        *self
            .document_sequences
            .entry(document.document_type)
            .or_insert(0) += 1;
        for parent in parent_documents(&document) {
            self.children.entry(parent).or_default().push(document.id);
        }
        self.documents.insert(document.id, document);
    }

    /// Replaces an existing document.
    pub fn put_document(&mut self, document: Document) {
        self.documents.insert(document.id, document);
    }

    /// Removes a document, its index entries and any idempotency key that
    /// created it.
    pub fn remove_document(&mut self, id: DocumentId) -> Option<Document> {
        let document = self.documents.remove(&id)?;
        self.deliveries
            .retain(|_, record| record.delivery_note_id != id);
        for parent in parent_documents(&document) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|c| *c != id);
            }
        }
        Some(document)
    }

    pub fn insert_pricing_request(&mut self, request: PricingRequest) {
        self.pricing_sequence += 1;
        self.pricing_requests.insert(request.id, request);
    }

    pub fn put_pricing_request(&mut self, request: PricingRequest) {
        self.pricing_requests.insert(request.id, request);
    }

    /// Cumulative amount paid against an invoice.
    pub fn amount_paid(&self, invoice_id: DocumentId) -> Decimal {
        self.payments
            .get(&invoice_id)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn set_amount_paid(&mut self, invoice_id: DocumentId, amount: Decimal) {
        self.payments.insert(invoice_id, amount);
    }

    pub fn delivery_record(&self, key: &str) -> Option<&DeliveryRecord> {
        self.deliveries.get(key)
    }

    pub fn insert_delivery_record(&mut self, key: String, record: DeliveryRecord) {
        self.deliveries.insert(key, record);
    }

    /// The document with its read-time overlay.
    pub fn view(&self, document: &Document, ctx: &OperationContext) -> DocumentView {
        DocumentView::new(
            document.clone(),
            self.amount_paid(document.id),
            ctx.today(),
        )
    }

    /// Completes `id` and then each ancestor whose completion condition holds.
    pub fn settle(&mut self, id: DocumentId, ctx: &OperationContext) -> EngineResult<()> {
        let mut current = Some(id);
        while let Some(id) = current {
            let document = self.document(id)?;
            let parent = parent_documents(document).next();
            let due = LifecycleService::completion_due(document, &self.children(id));

            if due {
                let action = LifecycleService::complete(document.status, ctx)?;
                let document_type = document.document_type;
                if let Some(document) = self.documents.get_mut(&id) {
                    action.apply(document);
                }
                info!(document_id = %id, document_type = %document_type, "Document completed");
            }
            current = parent;
        }
        Ok(())
    }

    /// Returns the receipt quantities a delivery note holds.
    ///
    /// Used when a draft or rejected note gives its allocation back.
    pub fn release_allocation(&mut self, note: &Document) -> EngineResult<()> {
        let Some(receipt_id) = note.parent_of_type(DocumentType::Receipt) else {
            return Ok(());
        };
        let mut receipt = self.document(receipt_id)?.clone();
        FulfillmentTracker::release(&mut receipt, &FulfillmentTracker::drawn_from_source(note))?;
        self.put_document(receipt);
        Ok(())
    }
}

fn parent_documents(document: &Document) -> impl Iterator<Item = DocumentId> + '_ {
    document.parent_links.iter().filter_map(|link| match link {
        ParentLink::Document { id, .. } => Some(*id),
        ParentLink::PricingRequest { .. } => None,
    })
}
