//! Core business logic for Docflow.
//!
//! This crate contains pure business logic with ZERO web or storage dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `calculation` - Line item pricing and document totals
//! - `document` - Documents, line items, pricing requests and read-time overlays
//! - `lifecycle` - Status state machine, guards and completion triggers
//! - `conversion` - Pricing request merge and document-to-document conversion
//! - `fulfillment` - Remaining-quantity accounting across delivery notes
//! - `context` - Explicit per-operation actor and clock
//! - `error` - Engine-wide error type

pub mod calculation;
pub mod context;
pub mod conversion;
pub mod document;
pub mod error;
pub mod fulfillment;
pub mod lifecycle;

pub use context::OperationContext;
pub use error::{EngineError, EngineResult};
