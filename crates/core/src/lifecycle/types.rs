//! Lifecycle actions.
//!
//! The service decides which action a request produces; applying the action
//! is a separate step so callers can validate everything else first.

use chrono::{DateTime, Utc};
use docflow_shared::types::UserId;

use crate::document::{Document, DocumentStatus};

/// A validated status transition with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Draft submitted for review.
    Submit {
        /// The new status after submission.
        new_status: DocumentStatus,
        /// Who submitted.
        submitted_by: UserId,
        /// When it was submitted.
        submitted_at: DateTime<Utc>,
    },
    /// Pending document approved.
    Approve {
        /// The new status after approval.
        new_status: DocumentStatus,
        /// Who approved.
        approved_by: UserId,
        /// When it was approved.
        approved_at: DateTime<Utc>,
        /// Approver's note, possibly empty.
        approval_notes: String,
    },
    /// Pending document rejected.
    Reject {
        /// The new status after rejection.
        new_status: DocumentStatus,
        /// Who rejected.
        rejected_by: UserId,
        /// When it was rejected.
        rejected_at: DateTime<Utc>,
        /// Trimmed rejection reason.
        rejection_reason: String,
    },
    /// Downstream work finished.
    Complete {
        /// The new status after completion.
        new_status: DocumentStatus,
        /// When it completed.
        completed_at: DateTime<Utc>,
    },
    /// A retried request that leaves the document as it is.
    Unchanged {
        /// The current status.
        status: DocumentStatus,
    },
}

impl LifecycleAction {
    /// Returns the status resulting from this action.
    #[must_use]
    pub fn new_status(&self) -> DocumentStatus {
        match self {
            Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Complete { new_status, .. } => *new_status,
            Self::Unchanged { status } => *status,
        }
    }

    /// Returns false for [`LifecycleAction::Unchanged`].
    #[must_use]
    pub fn changes_status(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }

    /// Writes the new status and audit fields onto `document`.
    pub fn apply(self, document: &mut Document) {
        let audit = &mut document.audit;
        let touched_at = match self {
            Self::Submit {
                new_status,
                submitted_by,
                submitted_at,
            } => {
                document.status = new_status;
                audit.submitted_by = Some(submitted_by);
                audit.submitted_at = Some(submitted_at);
                submitted_at
            }
            Self::Approve {
                new_status,
                approved_by,
                approved_at,
                approval_notes,
            } => {
                document.status = new_status;
                audit.approved_by = Some(approved_by);
                audit.approved_at = Some(approved_at);
                audit.approval_notes = Some(approval_notes);
                approved_at
            }
            Self::Reject {
                new_status,
                rejected_by,
                rejected_at,
                rejection_reason,
            } => {
                document.status = new_status;
                audit.rejected_by = Some(rejected_by);
                audit.rejected_at = Some(rejected_at);
                audit.rejection_reason = Some(rejection_reason);
                rejected_at
            }
            Self::Complete {
                new_status,
                completed_at,
            } => {
                document.status = new_status;
                audit.completed_at = Some(completed_at);
                completed_at
            }
            Self::Unchanged { .. } => return,
        };
        document.updated_at = touched_at;
    }
}
