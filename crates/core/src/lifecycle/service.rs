//! Lifecycle service for document status transitions.
//!
//! Every document type shares one state machine:
//!
//! ```text
//! draft ──submit──▶ pending_review ──approve──▶ approved ──complete──▶ completed
//!                          │
//!                          └──reject──▶ rejected
//! ```
//!
//! `rejected` and `completed` are terminal. A rejected document is retried by
//! cloning it into a new draft, never by resubmitting it in place.

use crate::calculation::CalculationError;
use crate::context::OperationContext;
use crate::document::{Document, DocumentSpec, DocumentStatus, DocumentType, LineItem};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::types::LifecycleAction;

/// Stateless service for document status transitions.
///
/// Methods validate a request against the current state and return the
/// resulting [`LifecycleAction`]; nothing is mutated until the caller applies it.
pub struct LifecycleService;

impl LifecycleService {
    /// Submits a draft for review.
    ///
    /// The document must have at least one line and its stored totals must
    /// match a fresh recomputation from the authoritative inputs.
    ///
    /// # Errors
    ///
    /// - `IllegalTransition` unless the document is a draft
    /// - `EmptyDocument` if it has no line items
    /// - `Calculation` if any line or document validation fails
    pub fn submit(
        document: &Document,
        ctx: &OperationContext,
    ) -> Result<LifecycleAction, LifecycleError> {
        Self::ensure_transition(document.status, DocumentStatus::PendingReview)?;
        Self::ensure_complete(document)?;

        Ok(LifecycleAction::Submit {
            new_status: DocumentStatus::PendingReview,
            submitted_by: ctx.actor,
            submitted_at: ctx.now,
        })
    }

    /// Approves a pending document.
    ///
    /// Approving an already approved document returns
    /// [`LifecycleAction::Unchanged`] so retried calls succeed.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` from any status other than pending review or approved.
    pub fn approve(
        current_status: DocumentStatus,
        approval_notes: Option<String>,
        ctx: &OperationContext,
    ) -> Result<LifecycleAction, LifecycleError> {
        if current_status == DocumentStatus::Approved {
            return Ok(LifecycleAction::Unchanged {
                status: DocumentStatus::Approved,
            });
        }
        Self::ensure_transition(current_status, DocumentStatus::Approved)?;

        Ok(LifecycleAction::Approve {
            new_status: DocumentStatus::Approved,
            approved_by: ctx.actor,
            approved_at: ctx.now,
            approval_notes: approval_notes.unwrap_or_default(),
        })
    }

    /// Rejects a pending document.
    ///
    /// # Errors
    ///
    /// - `RejectionReasonRequired` if the reason is blank
    /// - `IllegalTransition` unless the document is pending review
    pub fn reject(
        current_status: DocumentStatus,
        rejection_reason: &str,
        ctx: &OperationContext,
    ) -> Result<LifecycleAction, LifecycleError> {
        let rejection_reason = rejection_reason.trim();
        if rejection_reason.is_empty() {
            return Err(LifecycleError::RejectionReasonRequired);
        }

        Self::ensure_transition(current_status, DocumentStatus::Rejected)?;

        Ok(LifecycleAction::Reject {
            new_status: DocumentStatus::Rejected,
            rejected_by: ctx.actor,
            rejected_at: ctx.now,
            rejection_reason: rejection_reason.to_string(),
        })
    }

    /// Completes an approved document once its downstream work is done.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless the document is approved.
    pub fn complete(
        current_status: DocumentStatus,
        ctx: &OperationContext,
    ) -> Result<LifecycleAction, LifecycleError> {
        Self::ensure_transition(current_status, DocumentStatus::Completed)?;

        Ok(LifecycleAction::Complete {
            new_status: DocumentStatus::Completed,
            completed_at: ctx.now,
        })
    }

    /// Refuses edits and deletion outside draft.
    ///
    /// # Errors
    ///
    /// `NotEditable` for any status other than draft.
    pub fn ensure_editable(current_status: DocumentStatus) -> Result<(), LifecycleError> {
        if current_status.is_editable() {
            Ok(())
        } else {
            Err(LifecycleError::NotEditable {
                status: current_status,
            })
        }
    }

    /// Checks the guards a document must pass to leave draft.
    ///
    /// # Errors
    ///
    /// `EmptyDocument` or the recomputation's `Calculation` error.
    pub fn ensure_complete(document: &Document) -> Result<(), LifecycleError> {
        if document.line_items.is_empty() {
            return Err(LifecycleError::EmptyDocument);
        }

        let recomputed = document.calculate_totals()?;
        if recomputed != document.totals {
            return Err(CalculationError::invalid(
                "totals",
                "stored totals do not match the line items",
            )
            .into());
        }
        Ok(())
    }

    /// Returns true if `document` is approved and its completion condition holds.
    ///
    /// `children` are the documents converted from it.
    /// - Quotation: its invoice is approved
    /// - Invoice: its receipt is approved
    /// - Receipt: nothing left to allocate and every delivery note completed
    /// - Delivery note: every line fully delivered
    #[must_use]
    pub fn completion_due(document: &Document, children: &[&Document]) -> bool {
        if document.status != DocumentStatus::Approved {
            return false;
        }

        let approved_child = |child_type: DocumentType| {
            children.iter().any(|child| {
                child.document_type == child_type
                    && matches!(
                        child.status,
                        DocumentStatus::Approved | DocumentStatus::Completed
                    )
            })
        };

        match document.document_type {
            DocumentType::Quotation => approved_child(DocumentType::Invoice),
            DocumentType::Invoice => approved_child(DocumentType::Receipt),
            DocumentType::Receipt => {
                Self::fully_delivered(document)
                    && children
                        .iter()
                        .filter(|child| child.document_type == DocumentType::DeliveryNote)
                        .filter(|child| child.status != DocumentStatus::Rejected)
                        .all(|child| child.status == DocumentStatus::Completed)
            }
            DocumentType::DeliveryNote => Self::fully_delivered(document),
        }
    }

    /// Copies a rejected document into a new draft.
    ///
    /// Lines get fresh ids but keep their origin; parent links, deadlines and
    /// the received amount are carried over.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` unless the document is rejected, or the totals
    /// calculator's error.
    pub fn clone_rejected(
        document: &Document,
        document_number: String,
        ctx: &OperationContext,
    ) -> Result<Document, LifecycleError> {
        if document.status != DocumentStatus::Rejected {
            return Err(LifecycleError::IllegalTransition {
                from: document.status,
                to: DocumentStatus::Draft,
            });
        }

        let mut draft = Document::draft(
            DocumentSpec {
                document_type: document.document_type,
                document_number,
                customer_id: document.customer_id,
                line_items: document.line_items.iter().map(LineItem::duplicate).collect(),
                params: document.totals_params(),
                parent_links: document.parent_links.clone(),
                notes: document.notes.clone(),
            },
            ctx,
        )?;
        draft.valid_until = document.valid_until;
        draft.due_date = document.due_date;
        draft.amount_received = document.amount_received;
        Ok(draft)
    }

    /// Checks if a status transition is allowed.
    ///
    /// Allowed transitions:
    /// - Draft → PendingReview (submit)
    /// - PendingReview → Approved (approve)
    /// - PendingReview → Rejected (reject)
    /// - Approved → Completed (complete)
    #[must_use]
    pub fn is_valid_transition(from: DocumentStatus, to: DocumentStatus) -> bool {
        matches!(
            (from, to),
            (DocumentStatus::Draft, DocumentStatus::PendingReview)
                | (
                    DocumentStatus::PendingReview,
                    DocumentStatus::Approved | DocumentStatus::Rejected
                )
                | (DocumentStatus::Approved, DocumentStatus::Completed)
        )
    }

    fn ensure_transition(from: DocumentStatus, to: DocumentStatus) -> Result<(), LifecycleError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(LifecycleError::IllegalTransition { from, to })
        }
    }

    fn fully_delivered(document: &Document) -> bool {
        !document.line_items.is_empty()
            && document
                .line_items
                .iter()
                .all(|line| line.quantity_remaining.is_zero())
    }
}
