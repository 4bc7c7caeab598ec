// src/schema/mod.rs
pub mod normalize;
pub mod table;

pub use normalize::{normalize, normalize_table};
pub use table::{NormalizedTable, Row, TableSchema};
