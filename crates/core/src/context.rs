//! Explicit per-operation context.
//!
//! Every engine operation receives the acting user and the clock reading it
//! should use, so nothing reads session state or the system time implicitly.

use chrono::{DateTime, NaiveDate, Utc};
use docflow_shared::types::UserId;

/// Who performs an operation and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationContext {
    /// The acting user.
    pub actor: UserId,
    /// The instant the operation is evaluated at.
    pub now: DateTime<Utc>,
}

impl OperationContext {
    /// Creates a context for `actor` at the current time.
    #[must_use]
    pub fn new(actor: UserId) -> Self {
        Self::at(actor, Utc::now())
    }

    /// Creates a context for `actor` at a fixed instant.
    #[must_use]
    pub const fn at(actor: UserId, now: DateTime<Utc>) -> Self {
        Self { actor, now }
    }

    /// Calendar date of `now` in UTC.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
