//! Partial fulfillment tracking.
//!
//! - `tracker` - Allocation, release and progress reporting
//! - `error` - Fulfillment error types

pub mod error;
pub mod tracker;

#[cfg(test)]
mod tracker_props;

pub use error::FulfillmentError;
pub use tracker::{DeliveryAllocation, FulfillmentReport, FulfillmentTracker, ItemProgress};
