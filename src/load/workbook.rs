// src/load/workbook.rs

use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::{debug, info, instrument};

use super::{Cell, RawTable};
use crate::error::{PipelineError, Result};

/// The two worksheets the pipeline consumes, read once and never reopened.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub annual: RawTable,
    pub periodic: RawTable,
}

/// Open the workbook at `path` and read the annual and periodic worksheets.
///
/// Missing file and missing worksheet are both fatal; the error names the path
/// and the sheet so the run aborts with something actionable.
#[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_workbook<P: AsRef<Path>>(
    path: P,
    annual_sheet: &str,
    periodic_sheet: &str,
) -> Result<Workbook> {
    let path = path.as_ref();
    let mut book = open_workbook_auto(path).map_err(|source| PipelineError::OpenWorkbook {
        path: path.to_path_buf(),
        source,
    })?;

    let available = book.sheet_names();
    debug!(?available, "worksheets");

    let mut read = |sheet: &str| -> Result<RawTable> {
        if !available.iter().any(|s| s == sheet) {
            return Err(PipelineError::MissingSheet {
                path: path.to_path_buf(),
                sheet: sheet.to_string(),
                available: available.clone(),
            });
        }
        let range = book
            .worksheet_range(sheet)
            .map_err(|source| PipelineError::ReadSheet {
                sheet: sheet.to_string(),
                source,
            })?;
        Ok(range_to_raw_table(sheet, &range))
    };

    let annual = read(annual_sheet)?;
    let periodic = read(periodic_sheet)?;

    info!(
        annual_rows = annual.rows.len(),
        annual_cols = annual.headers.len(),
        periodic_rows = periodic.rows.len(),
        periodic_cols = periodic.headers.len(),
        "workbook loaded"
    );
    Ok(Workbook { annual, periodic })
}

/// Turn a worksheet range into a `RawTable`: first row is the header row,
/// fully empty rows are skipped.
pub fn range_to_raw_table(name: &str, range: &Range<Data>) -> RawTable {
    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(first) => first.iter().map(|d| data_to_cell(d).to_string()).collect(),
        None => Vec::new(),
    };

    let body: Vec<Vec<Cell>> = rows
        .map(|r| r.iter().map(data_to_cell).collect::<Vec<_>>())
        .filter(|r| !r.iter().all(Cell::is_empty))
        .collect();

    RawTable::new(name, headers, body)
}

fn data_to_cell(d: &Data) -> Cell {
    match d {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::text(s),
        Data::Bool(b) => Cell::Bool(*b),
        // dates, durations and cell errors ("#N/A") are never operator values
        other => Cell::text(&other.to_string()),
    }
}
