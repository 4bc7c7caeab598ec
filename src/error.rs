// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of the figure pipeline, tagged by the stage that raised them.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("load: cannot open workbook {path:?}: {source}")]
    OpenWorkbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("load: workbook {path:?} has no worksheet `{sheet}` (found: {available:?})")]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        available: Vec<String>,
    },

    #[error("load: cannot read worksheet `{sheet}`: {source}")]
    ReadSheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("normalize: table `{table}` columns `{first}` and `{second}` both normalize to `{canonical}`")]
    ColumnCollision {
        table: String,
        first: String,
        second: String,
        canonical: String,
    },

    #[error("normalize: table `{table}` column #{index} header `{raw}` has no letters or digits")]
    EmptyColumnName {
        table: String,
        index: usize,
        raw: String,
    },

    #[error("config: table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },

    #[error("align: {side} side has more than one record for ({period}, {operator})")]
    JoinKeyCollision {
        side: &'static str,
        period: String,
        operator: String,
    },

    #[error("derive: {series} has more than one value for period {period}")]
    DuplicatePeriod { series: String, period: String },

    #[error("config: {path:?}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
