//! Repositories: one unit of work per engine operation.
//!
//! Each repository wraps a [`crate::Store`] handle and exposes the
//! operations of one area of the engine.

pub mod conversion;
pub mod document;
pub mod fulfillment;
pub mod payment;
pub mod pricing_request;

pub use conversion::ConversionRepository;
pub use document::{CreateQuotationInput, DocumentFilter, DocumentRepository};
pub use fulfillment::FulfillmentRepository;
pub use payment::{PaymentRecord, PaymentRepository};
pub use pricing_request::PricingRequestRepository;
