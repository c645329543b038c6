//! Derived status overlays.
//!
//! Overlays are computed on read from persisted facts and never stored.
//! They sit beside `DocumentStatus` rather than extending it, so the
//! transition table stays the single source of persisted states.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Document, DocumentType};

/// Payment position of an invoice as reported by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid yet.
    Unpaid,
    /// Some, but not all, of the amount due is paid.
    Partial,
    /// The amount due is fully paid.
    Paid,
}

impl PaymentStatus {
    /// Classifies `amount_paid` against `amount_due`.
    #[must_use]
    pub fn from_amounts(amount_paid: Decimal, amount_due: Decimal) -> Self {
        if amount_paid >= amount_due {
            Self::Paid
        } else if amount_paid > Decimal::ZERO {
            Self::Partial
        } else {
            Self::Unpaid
        }
    }

    /// Returns true if any payment was recorded.
    #[must_use]
    pub fn has_payment(&self) -> bool {
        !matches!(self, Self::Unpaid)
    }
}

/// Delivery progress of a receipt or delivery note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    /// Nothing delivered yet.
    Pending,
    /// `0 < delivered < total`.
    Partial,
    /// Everything delivered.
    Completed,
}

impl FulfillmentStatus {
    /// Classifies `delivered` against `total`.
    #[must_use]
    pub fn from_quantities(delivered: Decimal, total: Decimal) -> Self {
        if delivered <= Decimal::ZERO {
            Self::Pending
        } else if delivered < total {
            Self::Partial
        } else {
            Self::Completed
        }
    }
}

/// Read-time view of an invoice's payment position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceOverlay {
    /// Payment classification.
    pub payment_status: PaymentStatus,
    /// Amount reported paid.
    pub amount_paid: Decimal,
    /// Net amount still unpaid, never negative.
    pub balance_due: Decimal,
    /// Past the due date and not fully paid.
    pub overdue: bool,
}

/// Overlay attached to a document on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusOverlay {
    /// Invoices carry payment and overdue information.
    Invoice(InvoiceOverlay),
    /// Receipts and delivery notes carry delivery progress.
    Fulfillment {
        /// Progress classification.
        status: FulfillmentStatus,
    },
    /// Quotations have no overlay.
    None,
}

/// A document as returned to callers, with its overlay attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentView {
    /// The persisted document.
    #[serde(flatten)]
    pub document: Document,
    /// Read-time overlay.
    pub overlay: StatusOverlay,
}

impl DocumentView {
    /// Attaches the overlay computed for `today`.
    #[must_use]
    pub fn new(document: Document, amount_paid: Decimal, today: NaiveDate) -> Self {
        let overlay = overlay_for(&document, amount_paid, today);
        Self { document, overlay }
    }
}

/// Returns true when `due_date` has passed and the invoice is not fully paid.
#[must_use]
pub fn is_overdue(due_date: Option<NaiveDate>, today: NaiveDate, payment: PaymentStatus) -> bool {
    due_date.is_some_and(|due| due < today) && payment != PaymentStatus::Paid
}

/// Computes the overlay for `document`.
///
/// `amount_paid` is the payment collaborator's figure for invoices and is
/// ignored for other types.
#[must_use]
pub fn overlay_for(document: &Document, amount_paid: Decimal, today: NaiveDate) -> StatusOverlay {
    match document.document_type {
        DocumentType::Quotation => StatusOverlay::None,
        DocumentType::Invoice => {
            let amount_due = document.totals.net_amount;
            let payment_status = PaymentStatus::from_amounts(amount_paid, amount_due);
            StatusOverlay::Invoice(InvoiceOverlay {
                payment_status,
                amount_paid,
                balance_due: (amount_due - amount_paid).max(Decimal::ZERO),
                overdue: is_overdue(document.due_date, today, payment_status),
            })
        }
        DocumentType::Receipt | DocumentType::DeliveryNote => StatusOverlay::Fulfillment {
            status: FulfillmentStatus::from_quantities(
                document.delivered_quantity(),
                document.total_quantity(),
            ),
        },
    }
}
