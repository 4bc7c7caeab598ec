// src/reshape/mod.rs
pub mod align;
pub mod filter;
pub mod long;

pub use align::{drop_aggregate, join, JoinedRecord};
pub use filter::{filter_by_category, filter_by_period};
pub use long::{reshape, LongRecord, PeriodKey};
