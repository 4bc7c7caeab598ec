// src/load/raw_table.rs

use std::fmt;
use tracing::warn;

/// One spreadsheet value after loading.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Build a text cell, trimming whitespace. Blank text becomes `Empty`.
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A worksheet as read from the workbook: raw header text plus rows of cells.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Worksheet name, used in log lines and error messages.
    pub name: String,
    /// Column headers exactly as authored in the first row.
    pub headers: Vec<String>,
    /// Data rows; every row has exactly `headers.len()` cells.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Assemble a table, padding short rows with `Empty` and truncating long ones.
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let name = name.into();
        let width = headers.len();

        if rows.iter().any(|r| r.len() > width) {
            warn!(
                table = %name,
                "some rows have more cells than headers ({} headers); extra cells dropped",
                width
            );
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();

        Self {
            name,
            headers,
            rows,
        }
    }

    /// True when the header and every cell of column `idx` are empty.
    pub fn column_is_blank(&self, idx: usize) -> bool {
        self.headers
            .get(idx)
            .map_or(true, |h| h.trim().is_empty())
            && self.rows.iter().all(|r| r.get(idx).map_or(true, Cell::is_empty))
    }
}
