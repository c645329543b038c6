//! Document lifecycle management.
//!
//! - `types` - Lifecycle actions with audit data
//! - `error` - Lifecycle error types
//! - `service` - Transition table, guards and completion triggers
//! - `edit` - All-or-nothing draft edits

pub mod edit;
pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use edit::DraftUpdate;
pub use error::LifecycleError;
pub use service::LifecycleService;
pub use types::LifecycleAction;
