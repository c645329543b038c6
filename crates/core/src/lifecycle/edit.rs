//! Draft editing.
//!
//! Line items and parameters only change while a document is a draft, and an
//! edit either applies in full or not at all.
//!
//! Only a quotation prices its own lines. Invoices and receipts carry lines,
//! rates and deposit forward from their source, and a delivery note's lines
//! follow its allocations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{Deposit, TotalsCalculator};
use crate::context::OperationContext;
use crate::document::{Document, DocumentType, LineItem, LineItemDraft};
use crate::fulfillment::DeliveryAllocation;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::service::LifecycleService;

/// Partial edit of a draft. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftUpdate {
    /// Replacement line items (quotations only).
    #[serde(default)]
    pub line_items: Option<Vec<LineItemDraft>>,
    /// Replacement allocation (delivery notes only).
    #[serde(default)]
    pub allocations: Option<Vec<DeliveryAllocation>>,
    /// New VAT rate (quotations only).
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
    /// New withholding tax rate.
    #[serde(default)]
    pub wht_rate: Option<Decimal>,
    /// New authoritative deposit.
    #[serde(default)]
    pub deposit: Option<Deposit>,
    /// New remarks.
    #[serde(default)]
    pub notes: Option<String>,
    /// New quotation expiry.
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
    /// New invoice due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl LifecycleService {
    /// Applies `update` to a draft and re-derives its totals.
    ///
    /// Allocations are not applied here; they move quantities on the source
    /// receipt and belong to the conversion step.
    ///
    /// # Errors
    ///
    /// - `NotEditable` unless the document is a draft
    /// - `FieldNotEditable` for a field the document type does not own
    /// - `Calculation` if the edited figures fail validation
    ///
    /// The document is unchanged on error.
    pub fn edit_draft(
        document: &mut Document,
        update: &DraftUpdate,
        ctx: &OperationContext,
    ) -> Result<(), LifecycleError> {
        Self::ensure_editable(document.status)?;

        let document_type = document.document_type;
        let prices_own_lines = document_type == DocumentType::Quotation;
        for (field, present, allowed) in [
            ("line_items", update.line_items.is_some(), prices_own_lines),
            ("tax_rate", update.tax_rate.is_some(), prices_own_lines),
            ("wht_rate", update.wht_rate.is_some(), prices_own_lines),
            ("deposit", update.deposit.is_some(), prices_own_lines),
            ("valid_until", update.valid_until.is_some(), prices_own_lines),
            (
                "allocations",
                update.allocations.is_some(),
                document_type == DocumentType::DeliveryNote,
            ),
            (
                "due_date",
                update.due_date.is_some(),
                document_type == DocumentType::Invoice,
            ),
        ] {
            if present && !allowed {
                return Err(LifecycleError::FieldNotEditable {
                    field,
                    document_type,
                });
            }
        }

        let mut staged = document.clone();
        if let Some(lines) = &update.line_items {
            staged.line_items = LineItem::price_all(lines)?;
        }
        if let Some(tax_rate) = update.tax_rate {
            staged.tax_rate = tax_rate;
        }
        if let Some(wht_rate) = update.wht_rate {
            staged.wht_rate = wht_rate;
        }
        if let Some(deposit) = update.deposit {
            staged.deposit = deposit;
        }
        if let Some(notes) = &update.notes {
            staged.notes = Some(notes.clone());
        }
        if update.valid_until.is_some() {
            staged.valid_until = update.valid_until;
        }
        if update.due_date.is_some() {
            staged.due_date = update.due_date;
        }

        let priced: Vec<_> = staged.line_items.iter().map(|l| l.pricing).collect();
        staged.totals = TotalsCalculator::aggregate(&priced, &staged.totals_params())?;
        staged.updated_at = ctx.now;

        *document = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::{Discount, LineItemInput, TotalsParams};
    use crate::document::{DocumentSpec, DocumentStatus};
    use docflow_shared::types::{CustomerId, UserId};
    use rust_decimal_macros::dec;

    fn draft_line(quantity: Decimal) -> LineItemDraft {
        LineItemDraft {
            source_reference: None,
            description: "Gasket".to_string(),
            unit: "pcs".to_string(),
            pricing: LineItemInput {
                quantity,
                unit_price: dec!(100),
                discount: Discount::Percent(dec!(10)),
            },
        }
    }

    fn quotation() -> Document {
        Document::draft(
            DocumentSpec {
                document_type: DocumentType::Quotation,
                document_number: "QT-000001".to_string(),
                customer_id: CustomerId::new(),
                line_items: LineItem::price_all(&[draft_line(dec!(10))]).unwrap(),
                params: TotalsParams::default(),
                parent_links: vec![],
                notes: None,
            },
            &OperationContext::new(UserId::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_edit_recomputes_totals() {
        let mut doc = quotation();
        let update = DraftUpdate {
            tax_rate: Some(dec!(7)),
            wht_rate: Some(dec!(3)),
            deposit: Some(Deposit::Percent(dec!(50))),
            ..DraftUpdate::default()
        };
        LifecycleService::edit_draft(&mut doc, &update, &OperationContext::new(UserId::new()))
            .unwrap();

        assert_eq!(doc.totals.total_amount, dec!(963));
        assert_eq!(doc.totals.net_amount, dec!(936));
        assert_eq!(doc.totals.deposit_amount, dec!(481.5));
        assert_eq!(doc.totals.remaining_amount, dec!(454.5));
    }

    #[test]
    fn test_invalid_edit_changes_nothing() {
        let mut doc = quotation();
        let before = doc.clone();
        let update = DraftUpdate {
            line_items: Some(vec![draft_line(dec!(2))]),
            deposit: Some(Deposit::Amount(dec!(10000))),
            ..DraftUpdate::default()
        };
        let err =
            LifecycleService::edit_draft(&mut doc, &update, &OperationContext::new(UserId::new()))
                .unwrap_err();
        assert_eq!(err.error_code(), "DEPOSIT_EXCEEDS_TOTAL");
        assert_eq!(doc, before);
    }

    #[test]
    fn test_edit_refused_outside_draft() {
        let mut doc = quotation();
        doc.status = DocumentStatus::PendingReview;
        let err = LifecycleService::edit_draft(
            &mut doc,
            &DraftUpdate::default(),
            &OperationContext::new(UserId::new()),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LifecycleError::NotEditable {
                status: DocumentStatus::PendingReview
            }
        );
    }

    #[test]
    fn test_fields_must_fit_document_type() {
        let mut doc = quotation();
        let ctx = OperationContext::new(UserId::new());
        let update = DraftUpdate {
            due_date: NaiveDate::from_ymd_opt(2026, 5, 1),
            ..DraftUpdate::default()
        };
        assert_eq!(
            LifecycleService::edit_draft(&mut doc, &update, &ctx),
            Err(LifecycleError::FieldNotEditable {
                field: "due_date",
                document_type: DocumentType::Quotation,
            })
        );

        let update = DraftUpdate {
            allocations: Some(vec![]),
            ..DraftUpdate::default()
        };
        assert!(matches!(
            LifecycleService::edit_draft(&mut doc, &update, &ctx),
            Err(LifecycleError::FieldNotEditable { field: "allocations", .. })
        ));
    }

    #[test]
    fn test_carried_forward_documents_keep_lines_and_terms() {
        let ctx = OperationContext::new(UserId::new());
        let edits = [
            (
                "line_items",
                DraftUpdate {
                    line_items: Some(vec![draft_line(dec!(1000))]),
                    ..DraftUpdate::default()
                },
            ),
            (
                "tax_rate",
                DraftUpdate {
                    tax_rate: Some(dec!(0)),
                    ..DraftUpdate::default()
                },
            ),
            (
                "wht_rate",
                DraftUpdate {
                    wht_rate: Some(dec!(5)),
                    ..DraftUpdate::default()
                },
            ),
            (
                "deposit",
                DraftUpdate {
                    deposit: Some(Deposit::Percent(dec!(20))),
                    ..DraftUpdate::default()
                },
            ),
        ];

        for document_type in [
            DocumentType::Invoice,
            DocumentType::Receipt,
            DocumentType::DeliveryNote,
        ] {
            for (field, update) in &edits {
                let mut doc = quotation();
                doc.document_type = document_type;
                let before = doc.clone();

                let err = LifecycleService::edit_draft(&mut doc, update, &ctx).unwrap_err();
                assert_eq!(
                    err,
                    LifecycleError::FieldNotEditable {
                        field: *field,
                        document_type,
                    }
                );
                assert_eq!(err.error_code(), "FIELD_NOT_EDITABLE");
                assert_eq!(doc, before);
            }
        }
    }

    #[test]
    fn test_invoice_draft_takes_notes_and_due_date() {
        let mut doc = quotation();
        doc.document_type = DocumentType::Invoice;
        let update = DraftUpdate {
            notes: Some("net 30".to_string()),
            due_date: NaiveDate::from_ymd_opt(2026, 5, 1),
            ..DraftUpdate::default()
        };
        LifecycleService::edit_draft(&mut doc, &update, &OperationContext::new(UserId::new()))
            .unwrap();
        assert_eq!(doc.notes.as_deref(), Some("net 30"));
        assert_eq!(doc.due_date, NaiveDate::from_ymd_opt(2026, 5, 1));
        assert_eq!(doc.totals.subtotal, dec!(900));
    }
}
