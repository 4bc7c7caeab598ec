// src/load/mod.rs
pub mod raw_table;
pub mod workbook;

pub use raw_table::{Cell, RawTable};
pub use workbook::{load_workbook, range_to_raw_table, Workbook};
