//! Conversion pipeline.
//!
//! ```text
//! pricing requests ─▶ quotation ─▶ invoice ─▶ receipt ─┬─▶ delivery note
//!                                                      ├─▶ delivery note
//!                                                      └─▶ ...
//! ```
//!
//! Each step validates its source, then builds the child as a new draft.
//! Nothing is mutated until every check has passed.

use chrono::{Days, NaiveDate};
use docflow_shared::EngineConfig;
use docflow_shared::types::{CustomerId, LineItemId, PricingRequestId};
use rust_decimal::Decimal;

use crate::calculation::{
    CalculationError, Deposit, Discount, LineItemCalculator, LineItemInput, TotalsCalculator,
    TotalsParams,
};
use crate::context::OperationContext;
use crate::conversion::error::ConversionError;
use crate::conversion::types::QuotationTerms;
use crate::document::{
    Document, DocumentSpec, DocumentStatus, DocumentType, LineItem, LineItemDraft, ParentLink,
    PaymentStatus, PricingRequest, PricingRequestStatus, SourceReference,
};
use crate::fulfillment::{DeliveryAllocation, FulfillmentError, FulfillmentTracker};

/// Stateless service that builds child documents from their sources.
pub struct ConversionService;

impl ConversionService {
    /// Creates a quotation from caller-supplied lines.
    ///
    /// # Errors
    ///
    /// `Calculation` if a line or the totals fail validation.
    pub fn new_quotation(
        customer_id: CustomerId,
        lines: &[LineItemDraft],
        terms: QuotationTerms,
        document_number: String,
        engine: &EngineConfig,
        ctx: &OperationContext,
    ) -> Result<Document, ConversionError> {
        let line_items = LineItem::price_all(lines)?;
        Self::build_quotation(customer_id, line_items, vec![], terms, document_number, engine, ctx)
    }

    /// Merges priced pricing requests into one quotation.
    ///
    /// Duplicate requests are collapsed. The caller links the requests to the
    /// returned quotation in the same unit of work.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `Calculation` for an empty request list
    /// - `AlreadyConverted` if any request is linked to a quotation
    /// - `SourceNotEligible` if any request is not priced
    /// - `CustomerMismatch` if the requests name different customers
    pub fn quotation_from_pricing_requests(
        requests: &[PricingRequest],
        terms: QuotationTerms,
        document_number: String,
        engine: &EngineConfig,
        ctx: &OperationContext,
    ) -> Result<Document, ConversionError> {
        let mut seen: Vec<PricingRequestId> = Vec::with_capacity(requests.len());
        let requests: Vec<&PricingRequest> = requests
            .iter()
            .filter(|request| {
                if seen.contains(&request.id) {
                    false
                } else {
                    seen.push(request.id);
                    true
                }
            })
            .collect();

        let Some(first) = requests.first() else {
            return Err(
                CalculationError::invalid("pricing_request_ids", "must not be empty").into(),
            );
        };

        if let Some(linked) = requests.iter().find(|r| r.is_linked()) {
            return Err(ConversionError::AlreadyConverted {
                subject: format!("pricing request {}", linked.request_number),
                existing: linked
                    .quotation_id
                    .map_or_else(String::new, |id| format!("quotation {id}")),
            });
        }

        let mut line_items = Vec::with_capacity(requests.len());
        for request in &requests {
            let unit_price = match (request.status, request.suggested_unit_price) {
                (PricingRequestStatus::Priced, Some(price)) => price,
                _ => {
                    return Err(ConversionError::not_eligible(
                        format!("pricing request {}", request.request_number),
                        format!("status is {}, expected priced", request.status),
                    ));
                }
            };

            let line = LineItem::from_draft(&LineItemDraft {
                source_reference: Some(SourceReference::PricingRequest(request.id)),
                description: request.description.clone(),
                unit: request.unit.clone(),
                pricing: LineItemInput {
                    quantity: request.quantity,
                    unit_price,
                    discount: Discount::default(),
                },
            })
            .map_err(|err| err.at_line(line_items.len()))?;
            line_items.push(line);
        }

        if let Some(other) = requests.iter().find(|r| r.customer_id != first.customer_id) {
            return Err(ConversionError::CustomerMismatch {
                expected: first.customer_id,
                found: other.customer_id,
            });
        }

        let parent_links = requests
            .iter()
            .map(|r| ParentLink::PricingRequest { id: r.id })
            .collect();
        Self::build_quotation(
            first.customer_id,
            line_items,
            parent_links,
            terms,
            document_number,
            engine,
            ctx,
        )
    }

    /// Converts an approved quotation into an invoice.
    ///
    /// Lines, parameters and totals are copied verbatim; every line starts
    /// undelivered. The due date is today plus the configured payment terms.
    ///
    /// # Errors
    ///
    /// - `SourceNotEligible` if the source is not a quotation or not approved
    /// - `AlreadyConverted` if `existing_invoice` is set
    pub fn invoice_from_quotation(
        quotation: &Document,
        existing_invoice: Option<&Document>,
        document_number: String,
        engine: &EngineConfig,
        ctx: &OperationContext,
    ) -> Result<Document, ConversionError> {
        Self::check_source(quotation, DocumentType::Quotation, existing_invoice)?;

        let mut invoice = Self::carry_forward(quotation, DocumentType::Invoice, document_number, ctx)?;
        invoice.due_date = Some(add_days(ctx, engine.payment_terms_days, "due_date")?);
        Ok(invoice)
    }

    /// Converts an approved, at least partly paid invoice into a receipt.
    ///
    /// # Errors
    ///
    /// - `SourceNotEligible` if the source is not an approved invoice or has
    ///   no recorded payment
    /// - `AlreadyConverted` if `existing_receipt` is set
    pub fn receipt_from_invoice(
        invoice: &Document,
        existing_receipt: Option<&Document>,
        amount_paid: Decimal,
        document_number: String,
        ctx: &OperationContext,
    ) -> Result<Document, ConversionError> {
        Self::check_source(invoice, DocumentType::Invoice, existing_receipt)?;

        let net_amount = invoice.totals.net_amount;
        if !PaymentStatus::from_amounts(amount_paid, net_amount).has_payment() {
            return Err(ConversionError::not_eligible(
                subject(invoice),
                "no payment has been recorded",
            ));
        }

        let mut receipt = Self::carry_forward(invoice, DocumentType::Receipt, document_number, ctx)?;
        receipt.amount_received = Some(amount_paid.min(net_amount));
        Ok(receipt)
    }

    /// Creates a delivery note for part of an approved receipt.
    ///
    /// The receipt's remaining quantities are decremented only when the note
    /// was built successfully; on error the receipt is untouched.
    ///
    /// # Errors
    ///
    /// - `SourceNotEligible` unless the receipt is approved
    /// - `Fulfillment` for an empty, unknown, non-positive or over-allocating request
    /// - `Calculation` if a delivered line fails validation
    pub fn delivery_from_receipt(
        receipt: &mut Document,
        allocations: &[DeliveryAllocation],
        document_number: String,
        ctx: &OperationContext,
    ) -> Result<Document, ConversionError> {
        Self::ensure_allocatable(receipt)?;

        let plan = FulfillmentTracker::plan(receipt, allocations)?;
        let line_items = delivery_lines(receipt, &plan)?;
        let note = Document::draft(
            DocumentSpec {
                document_type: DocumentType::DeliveryNote,
                document_number,
                customer_id: receipt.customer_id,
                line_items,
                params: delivery_params(receipt),
                parent_links: vec![parent_link(receipt)],
                notes: None,
            },
            ctx,
        )?;

        FulfillmentTracker::allocate(receipt, &plan)?;
        receipt.updated_at = ctx.now;
        Ok(note)
    }

    /// Replaces the allocation of a draft delivery note.
    ///
    /// The note's current draw is returned to the receipt before the new
    /// request is checked, so a note may be resized within what remains.
    ///
    /// # Errors
    ///
    /// Same as [`ConversionService::delivery_from_receipt`]; on error neither
    /// document changes.
    pub fn reallocate_delivery(
        receipt: &mut Document,
        note: &mut Document,
        allocations: &[DeliveryAllocation],
        ctx: &OperationContext,
    ) -> Result<(), ConversionError> {
        Self::ensure_allocatable(receipt)?;
        if note.document_type != DocumentType::DeliveryNote {
            return Err(ConversionError::not_eligible(
                subject(note),
                "only delivery notes carry allocations",
            ));
        }

        let mut staged = receipt.clone();
        FulfillmentTracker::release(&mut staged, &FulfillmentTracker::drawn_from_source(note))?;
        let plan = FulfillmentTracker::plan(&staged, allocations)?;
        let line_items = delivery_lines(&staged, &plan)?;
        let priced: Vec<_> = line_items.iter().map(|l| l.pricing).collect();
        let totals = TotalsCalculator::aggregate(&priced, &note.totals_params())?;
        FulfillmentTracker::allocate(&mut staged, &plan)?;

        staged.updated_at = ctx.now;
        *receipt = staged;
        note.line_items = line_items;
        note.totals = totals;
        note.updated_at = ctx.now;
        Ok(())
    }

    /// Refuses allocation against anything but an approved receipt.
    ///
    /// # Errors
    ///
    /// `SourceNotEligible`.
    pub fn ensure_allocatable(receipt: &Document) -> Result<(), ConversionError> {
        if receipt.document_type != DocumentType::Receipt {
            return Err(ConversionError::not_eligible(
                subject(receipt),
                "delivery notes are created from receipts",
            ));
        }
        if receipt.status != DocumentStatus::Approved {
            return Err(ConversionError::not_eligible(
                subject(receipt),
                format!("status is {}, expected approved", receipt.status),
            ));
        }
        Ok(())
    }

    fn check_source(
        source: &Document,
        expected: DocumentType,
        existing_child: Option<&Document>,
    ) -> Result<(), ConversionError> {
        if source.document_type != expected {
            return Err(ConversionError::not_eligible(
                subject(source),
                format!("expected a {expected}"),
            ));
        }
        if let Some(child) = existing_child {
            return Err(ConversionError::AlreadyConverted {
                subject: subject(source),
                existing: subject(child),
            });
        }
        if source.status != DocumentStatus::Approved {
            return Err(ConversionError::not_eligible(
                subject(source),
                format!("status is {}, expected approved", source.status),
            ));
        }
        Ok(())
    }

    fn carry_forward(
        source: &Document,
        document_type: DocumentType,
        document_number: String,
        ctx: &OperationContext,
    ) -> Result<Document, ConversionError> {
        let mut child = Document::draft(
            DocumentSpec {
                document_type,
                document_number,
                customer_id: source.customer_id,
                line_items: source.line_items.iter().map(LineItem::carry_forward).collect(),
                params: source.totals_params(),
                parent_links: vec![parent_link(source)],
                notes: source.notes.clone(),
            },
            ctx,
        )?;
        child.totals = source.totals;
        Ok(child)
    }

    fn build_quotation(
        customer_id: CustomerId,
        line_items: Vec<LineItem>,
        parent_links: Vec<ParentLink>,
        terms: QuotationTerms,
        document_number: String,
        engine: &EngineConfig,
        ctx: &OperationContext,
    ) -> Result<Document, ConversionError> {
        let valid_until = match terms.valid_until {
            Some(date) => date,
            None => add_days(ctx, engine.quotation_validity_days, "valid_until")?,
        };

        let mut quotation = Document::draft(
            DocumentSpec {
                document_type: DocumentType::Quotation,
                document_number,
                customer_id,
                line_items,
                params: terms.params,
                parent_links,
                notes: terms.notes,
            },
            ctx,
        )?;
        quotation.valid_until = Some(valid_until);
        Ok(quotation)
    }
}

/// Prices the delivered share of each planned receipt line.
///
/// The note keeps the source line's unit price and percentage discount.
fn delivery_lines(
    receipt: &Document,
    plan: &[DeliveryAllocation],
) -> Result<Vec<LineItem>, ConversionError> {
    plan.iter()
        .enumerate()
        .map(|(index, allocation)| {
            let source = receipt.line_item(allocation.line_item_id).ok_or(
                FulfillmentError::UnknownLineItem {
                    line_item_id: allocation.line_item_id,
                },
            )?;
            let pricing = LineItemCalculator::reprice(
                &source.pricing,
                allocation.delivery_quantity,
                source.pricing.unit_price,
            )
            .map_err(|err| err.at_line(index))?;

            Ok(LineItem {
                id: LineItemId::new(),
                source_reference: Some(SourceReference::LineItem(source.id)),
                description: source.description.clone(),
                unit: source.unit.clone(),
                quantity_remaining: pricing.quantity,
                pricing,
            })
        })
        .collect()
}

fn delivery_params(receipt: &Document) -> TotalsParams {
    TotalsParams {
        tax_rate: receipt.tax_rate,
        wht_rate: receipt.wht_rate,
        deposit: Deposit::default(),
    }
}

fn parent_link(source: &Document) -> ParentLink {
    ParentLink::Document {
        id: source.id,
        document_type: source.document_type,
    }
}

fn subject(document: &Document) -> String {
    format!("{} {}", document.document_type, document.document_number)
}

fn add_days(ctx: &OperationContext, days: u32, field: &str) -> Result<NaiveDate, CalculationError> {
    ctx.today()
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| CalculationError::invalid(field, "date out of range"))
}
