//! Document model shared by every stage of the pipeline.
//!
//! - `types` - Documents, line items, statuses and links
//! - `overlay` - Read-time payment and delivery overlays
//! - `pricing_request` - Upstream pricing requests

pub mod overlay;
pub mod pricing_request;
pub mod types;

pub use overlay::{
    DocumentView, FulfillmentStatus, InvoiceOverlay, PaymentStatus, StatusOverlay, is_overdue,
    overlay_for,
};
pub use pricing_request::{NewPricingRequest, PricingRequest, PricingRequestStatus};
pub use types::{
    ApprovalAudit, Document, DocumentSpec, DocumentStatus, DocumentType, LineItem, LineItemDraft,
    ParentLink, SourceReference,
};
