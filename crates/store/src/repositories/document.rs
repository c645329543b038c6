//! Document repository: creation, drafts, reads and status transitions.

use docflow_core::context::OperationContext;
use docflow_core::conversion::{ConversionError, ConversionService, QuotationTerms};
use docflow_core::document::{
    Document, DocumentStatus, DocumentType, DocumentView, LineItemDraft, ParentLink,
};
use docflow_core::fulfillment::FulfillmentTracker;
use docflow_core::lifecycle::{DraftUpdate, LifecycleService};
use docflow_core::EngineResult;
use docflow_shared::types::{CustomerId, DocumentId, PageRequest, PageResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::Store;
use crate::state::StoreState;

/// Input for a quotation entered by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateQuotationInput {
    /// Customer quoted.
    pub customer_id: CustomerId,
    /// Lines to price.
    #[serde(default)]
    pub line_items: Vec<LineItemDraft>,
    /// Tax, deposit, expiry and remarks.
    #[serde(flatten)]
    pub terms: QuotationTerms,
}

/// Filter for listing documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFilter {
    /// Only this type.
    #[serde(default)]
    pub document_type: Option<DocumentType>,
    /// Only this status.
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    /// Only this customer.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

impl DocumentFilter {
    fn matches(&self, document: &Document) -> bool {
        self.document_type.is_none_or(|t| t == document.document_type)
            && self.status.is_none_or(|s| s == document.status)
            && self.customer_id.is_none_or(|c| c == document.customer_id)
    }
}

/// Document repository.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    store: Store,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates a quotation from caller-supplied lines.
    ///
    /// # Errors
    ///
    /// Returns a validation error for invalid lines or parameters.
    pub async fn create_quotation(
        &self,
        input: CreateQuotationInput,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let quotation = ConversionService::new_quotation(
            input.customer_id,
            &input.line_items,
            input.terms,
            state.next_document_number(DocumentType::Quotation),
            self.store.engine(),
            ctx,
        )
        .inspect_err(|err| warn!(error = %err, "Quotation creation refused"))?;

        info!(
            document_id = %quotation.id,
            document_number = %quotation.document_number,
            total_amount = %quotation.totals.total_amount,
            "Quotation created"
        );
        let view = state.view(&quotation, ctx);
        state.insert_document(quotation);
        Ok(view)
    }

    /// Fetches a document with its overlay.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if the document does not exist.
    pub async fn get(&self, id: DocumentId, ctx: &OperationContext) -> EngineResult<DocumentView> {
        let state = self.store.lock().await;
        let document = state.document(id)?;
        Ok(state.view(document, ctx))
    }

    /// Lists documents, oldest first.
    pub async fn list(
        &self,
        filter: DocumentFilter,
        page: &PageRequest,
        ctx: &OperationContext,
    ) -> PageResponse<DocumentView> {
        let state = self.store.lock().await;

        let mut matching: Vec<&Document> =
            state.documents().filter(|d| filter.matches(d)).collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as u64;
        let data = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .map(|d| state.view(d, ctx))
            .collect();
        PageResponse::new(data, page, total)
    }

    /// Edits a draft.
    ///
    /// For a delivery note, `allocations` resizes the note against its
    /// receipt in the same unit of work.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` outside draft, or any validation or allocation error.
    pub async fn update_draft(
        &self,
        id: DocumentId,
        update: DraftUpdate,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let mut document = state.document(id)?.clone();
        LifecycleService::edit_draft(&mut document, &update, ctx)
            .inspect_err(|err| warn!(document_id = %id, error = %err, "Draft update refused"))?;

        let receipt = match (&update.allocations, document.parent_of_type(DocumentType::Receipt)) {
            (Some(allocations), Some(receipt_id)) => {
                let mut receipt = state.document(receipt_id)?.clone();
                ConversionService::reallocate_delivery(
                    &mut receipt,
                    &mut document,
                    allocations,
                    ctx,
                )
                .inspect_err(|err| {
                    warn!(document_id = %id, error = %err, "Delivery reallocation refused");
                })?;
                Some(receipt)
            }
            (Some(_), None) => {
                return Err(ConversionError::not_eligible(
                    format!("{} {}", document.document_type, document.document_number),
                    "no receipt to allocate from",
                )
                .into());
            }
            (None, _) => None,
        };

        if let Some(receipt) = receipt {
            state.put_document(receipt);
        }
        info!(document_id = %id, "Draft updated");
        let view = state.view(&document, ctx);
        state.put_document(document);
        Ok(view)
    }

    /// Deletes a draft.
    ///
    /// A quotation frees the pricing requests it consumed; a delivery note
    /// gives its quantities back to the receipt.
    ///
    /// # Errors
    ///
    /// Returns `NotEditable` for anything but a draft.
    pub async fn delete_draft(&self, id: DocumentId, ctx: &OperationContext) -> EngineResult<()> {
        let mut state = self.store.lock().await;

        let document = state.document(id)?.clone();
        LifecycleService::ensure_editable(document.status)
            .inspect_err(|err| warn!(document_id = %id, error = %err, "Delete refused"))?;

        release_sources(&mut state, &document, ctx)?;
        state.remove_document(id);
        info!(document_id = %id, document_number = %document.document_number, "Draft deleted");
        Ok(())
    }

    /// Copies a rejected document into a new draft.
    ///
    /// The copy takes over what the rejected document consumed: pricing
    /// requests are linked to it and a delivery note allocates again.
    ///
    /// # Errors
    ///
    /// - `IllegalTransition` unless the document is rejected
    /// - `AlreadyConverted` if a source has been consumed again meanwhile
    /// - `OverAllocation` if the receipt no longer has the quantities
    pub async fn clone_document(
        &self,
        id: DocumentId,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let original = state.document(id)?;
        let copy = LifecycleService::clone_rejected(
            original,
            state.next_document_number(original.document_type),
            ctx,
        )
        .inspect_err(|err| warn!(document_id = %id, error = %err, "Clone refused"))?;

        let mut requests = Vec::new();
        let mut receipt = None;
        for link in &copy.parent_links {
            match *link {
                ParentLink::PricingRequest { id: request_id } => {
                    let mut request = state.pricing_request(request_id)?.clone();
                    if request.is_linked() {
                        return Err(ConversionError::AlreadyConverted {
                            subject: format!("pricing request {}", request.request_number),
                            existing: "another quotation".to_string(),
                        }
                        .into());
                    }
                    request.link(copy.id, ctx);
                    requests.push(request);
                }
                ParentLink::Document {
                    id: parent_id,
                    document_type: DocumentType::Receipt,
                } if copy.document_type == DocumentType::DeliveryNote => {
                    let mut staged = state.document(parent_id)?.clone();
                    ConversionService::ensure_allocatable(&staged)?;
                    FulfillmentTracker::allocate(
                        &mut staged,
                        &FulfillmentTracker::drawn_from_source(&copy),
                    )?;
                    staged.updated_at = ctx.now;
                    receipt = Some(staged);
                }
                ParentLink::Document { id: parent_id, .. } => {
                    if let Some(existing) = state.live_child(parent_id, copy.document_type) {
                        let parent = state.document(parent_id)?;
                        return Err(ConversionError::AlreadyConverted {
                            subject: format!("{} {}", parent.document_type, parent.document_number),
                            existing: format!(
                                "{} {}",
                                existing.document_type, existing.document_number
                            ),
                        }
                        .into());
                    }
                }
            }
        }

        for request in requests {
            state.put_pricing_request(request);
        }
        if let Some(receipt) = receipt {
            state.put_document(receipt);
        }
        info!(
            document_id = %copy.id,
            cloned_from = %id,
            document_number = %copy.document_number,
            "Rejected document cloned"
        );
        let view = state.view(&copy, ctx);
        state.insert_document(copy);
        Ok(view)
    }

    /// Submits a draft for review.
    ///
    /// # Errors
    ///
    /// `IllegalTransition`, `EmptyDocument` or a validation error.
    pub async fn submit(&self, id: DocumentId, ctx: &OperationContext) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let mut document = state.document(id)?.clone();
        LifecycleService::submit(&document, ctx)
            .inspect_err(|err| warn!(document_id = %id, error = %err, "Submit refused"))?
            .apply(&mut document);

        info!(document_id = %id, status = %document.status, "Document submitted");
        let view = state.view(&document, ctx);
        state.put_document(document);
        Ok(view)
    }

    /// Approves a pending document; approving again is a no-op.
    ///
    /// Approval may complete the parent: an approved invoice completes its
    /// quotation and an approved receipt completes its invoice.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` from any other status.
    pub async fn approve(
        &self,
        id: DocumentId,
        notes: Option<String>,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let mut document = state.document(id)?.clone();
        let action = LifecycleService::approve(document.status, notes, ctx)
            .inspect_err(|err| warn!(document_id = %id, error = %err, "Approve refused"))?;

        if action.changes_status() {
            action.apply(&mut document);
            state.put_document(document);
            state.settle(id, ctx)?;
            info!(document_id = %id, "Document approved");
        }

        let document = state.document(id)?;
        Ok(state.view(document, ctx))
    }

    /// Rejects a pending document.
    ///
    /// Like deletion, rejection frees what the document consumed.
    ///
    /// # Errors
    ///
    /// `RejectionReasonRequired` or `IllegalTransition`.
    pub async fn reject(
        &self,
        id: DocumentId,
        reason: &str,
        ctx: &OperationContext,
    ) -> EngineResult<DocumentView> {
        let mut state = self.store.lock().await;

        let mut document = state.document(id)?.clone();
        LifecycleService::reject(document.status, reason, ctx)
            .inspect_err(|err| warn!(document_id = %id, error = %err, "Reject refused"))?
            .apply(&mut document);

        release_sources(&mut state, &document, ctx)?;
        info!(document_id = %id, "Document rejected");
        let view = state.view(&document, ctx);
        state.put_document(document);
        Ok(view)
    }
}

/// Frees pricing requests and receipt quantities held by `document`.
fn release_sources(
    state: &mut StoreState,
    document: &Document,
    ctx: &OperationContext,
) -> EngineResult<()> {
    match document.document_type {
        DocumentType::Quotation => {
            for request_id in document.pricing_request_ids() {
                let mut request = state.pricing_request(request_id)?.clone();
                if request.quotation_id == Some(document.id) {
                    request.unlink(ctx);
                    state.put_pricing_request(request);
                }
            }
            Ok(())
        }
        DocumentType::DeliveryNote => state.release_allocation(document),
        DocumentType::Invoice | DocumentType::Receipt => Ok(()),
    }
}
