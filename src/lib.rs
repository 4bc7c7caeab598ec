// src/lib.rs
pub mod config;
pub mod error;
pub mod figures;
pub mod labels;
pub mod load;
pub mod reshape;
pub mod schema;

pub use config::Config;
pub use error::PipelineError;
