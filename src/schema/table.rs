// src/schema/table.rs

use std::collections::{BTreeSet, HashMap};

use crate::error::{PipelineError, Result};
use crate::load::Cell;

/// Which columns of a normalized table are metadata and which are operators.
///
/// Decided once from the configured metadata names; reshaping only ever looks
/// at `operators`, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub metadata: BTreeSet<String>,
    pub operators: Vec<String>,
}

impl TableSchema {
    pub fn split(columns: &[String], metadata: &BTreeSet<String>) -> Self {
        let mut schema = TableSchema::default();
        for col in columns {
            if metadata.contains(col) {
                schema.metadata.insert(col.clone());
            } else {
                schema.operators.push(col.clone());
            }
        }
        schema
    }

    pub fn is_metadata(&self, column: &str) -> bool {
        self.metadata.contains(column)
    }

    pub fn is_operator(&self, column: &str) -> bool {
        self.operators.iter().any(|c| c == column)
    }
}

/// A worksheet after header normalization. Immutable once built.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    name: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
    schema: TableSchema,
}

impl NormalizedTable {
    pub(crate) fn new(
        name: String,
        columns: Vec<String>,
        rows: Vec<Vec<Cell>>,
        schema: TableSchema,
    ) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            name,
            columns,
            index,
            rows,
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    /// Like `column_index`, but a missing column is a configuration error.
    pub fn require_column(&self, column: &str) -> Result<usize> {
        self.column_index(column)
            .ok_or_else(|| PipelineError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        self.rows.get(position).map(|cells| Row {
            table: self,
            position,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        self.rows.iter().enumerate().map(move |(position, cells)| Row {
            table: self,
            position,
            cells,
        })
    }
}

/// A borrowed view of one row, addressable by canonical column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a NormalizedTable,
    position: usize,
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn table(&self) -> &'a NormalizedTable {
        self.table
    }

    /// Zero-based position of this row in its table.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn cells(&self) -> &'a [Cell] {
        self.cells
    }

    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        self.table
            .column_index(column)
            .and_then(|i| self.cells.get(i))
    }
}
