//! Conversion pipeline between document types.
//!
//! - `types` - Conversion inputs
//! - `error` - Conversion error taxonomy
//! - `service` - Pricing request merge and document-to-document transforms

pub mod error;
pub mod service;
pub mod types;

pub use error::ConversionError;
pub use service::ConversionService;
pub use types::QuotationTerms;
