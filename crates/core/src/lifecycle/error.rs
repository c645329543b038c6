//! Lifecycle error types.

use thiserror::Error;

use crate::calculation::CalculationError;
use crate::document::{DocumentStatus, DocumentType};

/// Errors raised while moving a document between statuses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The transition table does not allow this edge.
    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition {
        /// The current status.
        from: DocumentStatus,
        /// The attempted target status.
        to: DocumentStatus,
    },

    /// Rejecting needs a non-blank reason.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// A document without line items cannot leave draft.
    #[error("Document has no line items")]
    EmptyDocument,

    /// Only drafts may be edited or deleted.
    #[error("Document in status {status} can no longer be edited")]
    NotEditable {
        /// The current status.
        status: DocumentStatus,
    },

    /// The field is carried forward from the source or does not exist on
    /// this document type.
    #[error("{field} cannot be edited on a {document_type}")]
    FieldNotEditable {
        /// The refused field.
        field: &'static str,
        /// The document's type.
        document_type: DocumentType,
    },

    /// Stored figures failed re-validation.
    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl LifecycleError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::IllegalTransition { .. } | Self::NotEditable { .. } => 409,
            Self::RejectionReasonRequired => 400,
            Self::EmptyDocument | Self::FieldNotEditable { .. } => 422,
            Self::Calculation(err) => err.status_code(),
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::EmptyDocument => "EMPTY_DOCUMENT",
            Self::NotEditable { .. } => "NOT_EDITABLE",
            Self::FieldNotEditable { .. } => "FIELD_NOT_EDITABLE",
            Self::Calculation(err) => err.error_code(),
        }
    }
}
