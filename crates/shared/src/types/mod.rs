//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{MONEY_SCALE, PERCENT_SCALE, percent_of, ratio_as_percent, round_money, round_percent};
pub use pagination::{PageMeta, PageRequest, PageResponse};
