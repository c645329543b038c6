//! Document domain types.
//!
//! A `Document` is one quotation, invoice, receipt or delivery note. Its
//! monetary figures are always derived from the line items and the
//! authoritative tax/deposit parameters; nothing here is hand-edited.

use chrono::{DateTime, NaiveDate, Utc};
use docflow_shared::types::{
    CustomerId, DocumentId, LineItemId, PricingRequestId, ProductId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calculation::{
    CalculationError, Deposit, Discount, DocumentTotals, LineItemCalculator, LineItemInput,
    PricedLine, TotalsCalculator, TotalsParams,
};
use crate::context::OperationContext;

/// The four document kinds of the sales pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Priced offer to a customer.
    Quotation,
    /// Bill issued for an approved quotation.
    Invoice,
    /// Acknowledgement of payment against an invoice.
    Receipt,
    /// Shipment of (part of) a receipt's goods.
    DeliveryNote,
}

impl DocumentType {
    /// Returns the string representation of the type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quotation => "quotation",
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::DeliveryNote => "delivery_note",
        }
    }

    /// Parses a type from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quotation" => Some(Self::Quotation),
            "invoice" => Some(Self::Invoice),
            "receipt" => Some(Self::Receipt),
            "delivery_note" => Some(Self::DeliveryNote),
            _ => None,
        }
    }

    /// Prefix used for human-readable document numbers.
    #[must_use]
    pub fn number_prefix(&self) -> &'static str {
        match self {
            Self::Quotation => "QT",
            Self::Invoice => "INV",
            Self::Receipt => "RC",
            Self::DeliveryNote => "DN",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted document status, shared by every document type.
///
/// Valid transitions:
/// - Draft → PendingReview (submit)
/// - PendingReview → Approved (approve)
/// - PendingReview → Rejected (reject)
/// - Approved → Completed (downstream work finished)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Being prepared; line items and parameters are editable.
    Draft,
    /// Submitted and waiting for a decision.
    PendingReview,
    /// Approved; may be converted downstream.
    Approved,
    /// Rejected (terminal). Clone into a new draft to retry.
    Rejected,
    /// All downstream work is done (terminal).
    Completed,
}

impl DocumentStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Completed => "completed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending_review" => Some(Self::PendingReview),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Returns true if line items and parameters may still change.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A link from a document to something it was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParentLink {
    /// Merged from a pricing request.
    PricingRequest {
        /// The pricing request.
        id: PricingRequestId,
    },
    /// Converted from another document.
    Document {
        /// The parent document.
        id: DocumentId,
        /// The parent's type.
        document_type: DocumentType,
    },
}

/// Where a line item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SourceReference {
    /// Built from a pricing request's suggestion.
    PricingRequest(PricingRequestId),
    /// Picked from the product catalog.
    Product(ProductId),
    /// Carried forward from a line on the parent document.
    LineItem(LineItemId),
}

/// Caller-supplied content of a line item, before pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemDraft {
    /// Optional origin of the line.
    #[serde(default)]
    pub source_reference: Option<SourceReference>,
    /// Display text.
    #[serde(default)]
    pub description: String,
    /// Display unit label, e.g. `pcs`.
    #[serde(default)]
    pub unit: String,
    /// Quantity and price inputs.
    #[serde(flatten)]
    pub pricing: LineItemInput,
}

/// One priced unit within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Line identifier, stable for the life of the document.
    pub id: LineItemId,
    /// Optional origin of the line.
    pub source_reference: Option<SourceReference>,
    /// Display text.
    pub description: String,
    /// Display unit label.
    pub unit: String,
    /// Inputs and derived figures.
    #[serde(flatten)]
    pub pricing: PricedLine,
    /// Quantity not yet delivered.
    pub quantity_remaining: Decimal,
}

impl LineItem {
    /// Prices a draft into a new line with nothing delivered.
    ///
    /// # Errors
    ///
    /// Returns the line calculator's validation error.
    pub fn from_draft(draft: &LineItemDraft) -> Result<Self, CalculationError> {
        let pricing = LineItemCalculator::calculate(&draft.pricing)?;
        Ok(Self {
            id: LineItemId::new(),
            source_reference: draft.source_reference,
            description: draft.description.clone(),
            unit: draft.unit.clone(),
            quantity_remaining: pricing.quantity,
            pricing,
        })
    }

    /// Prices every draft, tagging failures with the line index.
    ///
    /// # Errors
    ///
    /// Returns the first line's validation error.
    pub fn price_all(drafts: &[LineItemDraft]) -> Result<Vec<Self>, CalculationError> {
        drafts
            .iter()
            .enumerate()
            .map(|(index, draft)| Self::from_draft(draft).map_err(|err| err.at_line(index)))
            .collect()
    }

    /// Copies this line under a fresh id for a child document, pointing back here.
    #[must_use]
    pub fn carry_forward(&self) -> Self {
        Self {
            id: LineItemId::new(),
            source_reference: Some(SourceReference::LineItem(self.id)),
            description: self.description.clone(),
            unit: self.unit.clone(),
            pricing: self.pricing,
            quantity_remaining: self.pricing.quantity,
        }
    }

    /// Copies this line under a fresh id, keeping its origin and resetting delivery.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: LineItemId::new(),
            source_reference: self.source_reference,
            description: self.description.clone(),
            unit: self.unit.clone(),
            pricing: self.pricing,
            quantity_remaining: self.pricing.quantity,
        }
    }

    /// Quantity on the line.
    #[must_use]
    pub fn quantity(&self) -> Decimal {
        self.pricing.quantity
    }

    /// Quantity already delivered.
    #[must_use]
    pub fn delivered_quantity(&self) -> Decimal {
        self.pricing.quantity - self.quantity_remaining
    }

    /// Authoritative discount on the line.
    #[must_use]
    pub fn discount(&self) -> Discount {
        self.pricing.discount
    }
}

/// Approval audit trail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalAudit {
    /// Who submitted the current cycle.
    pub submitted_by: Option<UserId>,
    /// When the current cycle was submitted.
    pub submitted_at: Option<DateTime<Utc>>,
    /// Who approved.
    pub approved_by: Option<UserId>,
    /// When it was approved.
    pub approved_at: Option<DateTime<Utc>>,
    /// Approver's note (may be empty).
    pub approval_notes: Option<String>,
    /// Who rejected.
    pub rejected_by: Option<UserId>,
    /// When it was rejected.
    pub rejected_at: Option<DateTime<Utc>>,
    /// Why it was rejected.
    pub rejection_reason: Option<String>,
    /// When downstream work completed it.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A quotation, invoice, receipt or delivery note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier.
    pub id: DocumentId,
    /// Kind of document.
    pub document_type: DocumentType,
    /// Human-readable number, e.g. `INV-000042`.
    pub document_number: String,
    /// The customer billed or delivered to.
    pub customer_id: CustomerId,
    /// Current persisted status.
    pub status: DocumentStatus,
    /// Ordered line items.
    pub line_items: Vec<LineItem>,
    /// VAT rate in percent.
    pub tax_rate: Decimal,
    /// Withholding tax rate in percent.
    pub wht_rate: Decimal,
    /// Authoritative deposit input.
    pub deposit: Deposit,
    /// Derived monetary figures.
    pub totals: DocumentTotals,
    /// What this document was created from.
    pub parent_links: Vec<ParentLink>,
    /// Quotation expiry.
    pub valid_until: Option<NaiveDate>,
    /// Invoice payment deadline.
    pub due_date: Option<NaiveDate>,
    /// Amount acknowledged by a receipt.
    pub amount_received: Option<Decimal>,
    /// Free-form remarks.
    pub notes: Option<String>,
    /// Approval audit trail.
    pub audit: ApprovalAudit,
    /// Who created the document.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Content of a document under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSpec {
    /// Kind of document.
    pub document_type: DocumentType,
    /// Number assigned by the store.
    pub document_number: String,
    /// Customer.
    pub customer_id: CustomerId,
    /// Priced line items.
    pub line_items: Vec<LineItem>,
    /// Tax and deposit parameters.
    pub params: TotalsParams,
    /// Parent links.
    pub parent_links: Vec<ParentLink>,
    /// Free-form remarks.
    pub notes: Option<String>,
}

impl Document {
    /// Builds a new draft and derives its totals.
    ///
    /// # Errors
    ///
    /// Returns the totals calculator's error.
    pub fn draft(spec: DocumentSpec, ctx: &OperationContext) -> Result<Self, CalculationError> {
        let priced: Vec<PricedLine> = spec.line_items.iter().map(|l| l.pricing).collect();
        let totals = TotalsCalculator::aggregate(&priced, &spec.params)?;

        Ok(Self {
            id: DocumentId::new(),
            document_type: spec.document_type,
            document_number: spec.document_number,
            customer_id: spec.customer_id,
            status: DocumentStatus::Draft,
            line_items: spec.line_items,
            tax_rate: spec.params.tax_rate,
            wht_rate: spec.params.wht_rate,
            deposit: spec.params.deposit,
            totals,
            parent_links: spec.parent_links,
            valid_until: None,
            due_date: None,
            amount_received: None,
            notes: spec.notes,
            audit: ApprovalAudit::default(),
            created_by: ctx.actor,
            created_at: ctx.now,
            updated_at: ctx.now,
        })
    }

    /// Tax and deposit parameters as one value.
    #[must_use]
    pub fn totals_params(&self) -> TotalsParams {
        TotalsParams {
            tax_rate: self.tax_rate,
            wht_rate: self.wht_rate,
            deposit: self.deposit,
        }
    }

    /// Re-derives every line and the document totals from authoritative inputs.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn calculate_totals(&self) -> Result<DocumentTotals, CalculationError> {
        let lines = self
            .line_items
            .iter()
            .map(|l| l.pricing.input())
            .collect::<Vec<_>>();
        TotalsCalculator::calculate(&lines, &self.totals_params()).map(|result| result.totals)
    }

    /// Finds a line by id.
    #[must_use]
    pub fn line_item(&self, id: LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|l| l.id == id)
    }

    /// Returns the parent document of the given type, if linked.
    #[must_use]
    pub fn parent_of_type(&self, document_type: DocumentType) -> Option<DocumentId> {
        self.parent_links.iter().find_map(|link| match link {
            ParentLink::Document {
                id,
                document_type: t,
            } if *t == document_type => Some(*id),
            _ => None,
        })
    }

    /// Returns the pricing requests merged into this document.
    #[must_use]
    pub fn pricing_request_ids(&self) -> Vec<PricingRequestId> {
        self.parent_links
            .iter()
            .filter_map(|link| match link {
                ParentLink::PricingRequest { id } => Some(*id),
                ParentLink::Document { .. } => None,
            })
            .collect()
    }

    /// Σ quantity over all lines.
    #[must_use]
    pub fn total_quantity(&self) -> Decimal {
        self.line_items.iter().map(LineItem::quantity).sum()
    }

    /// Σ delivered quantity over all lines.
    #[must_use]
    pub fn delivered_quantity(&self) -> Decimal {
        self.line_items.iter().map(LineItem::delivered_quantity).sum()
    }
}
