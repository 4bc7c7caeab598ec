// src/reshape/long.rs

use serde::Serialize;
use std::fmt;
use tracing::{trace, warn};

use crate::error::Result;
use crate::load::Cell;
use crate::schema::Row;

/// Reporting period attached to a long record.
///
/// Ordering puts years first (ascending), then free-text labels, then rows
/// that carried no period column and are identified by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PeriodKey {
    Year(i64),
    Label(String),
    Row(usize),
}

impl PeriodKey {
    /// Read a period from a single cell. Empty cells have no period.
    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell {
            Cell::Empty => None,
            Cell::Number(v) if v.fract() == 0.0 && v.is_finite() => Some(PeriodKey::Year(*v as i64)),
            Cell::Text(s) => Some(
                s.parse::<i64>()
                    .map(PeriodKey::Year)
                    .unwrap_or_else(|_| PeriodKey::Label(s.clone())),
            ),
            other => Some(PeriodKey::Label(other.to_string())),
        }
    }

    fn from_key_cells(cells: &[&Cell], position: usize) -> Option<Self> {
        match cells {
            [] => Some(PeriodKey::Row(position)),
            [one] => PeriodKey::from_cell(one),
            many => {
                if many.iter().any(|c| c.is_empty()) {
                    return None;
                }
                let parts: Vec<String> = many.iter().map(|c| c.to_string()).collect();
                Some(PeriodKey::Label(parts.join(" / ")))
            }
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKey::Year(y) => write!(f, "{}", y),
            PeriodKey::Label(s) => f.write_str(s),
            PeriodKey::Row(i) => write!(f, "#{}", i + 1),
        }
    }
}

/// One tidy observation: an operator's value in one period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub period: PeriodKey,
    pub operator: String,
    pub value: f64,
}

impl LongRecord {
    pub fn new(period: PeriodKey, operator: impl Into<String>, value: f64) -> Self {
        Self {
            period,
            operator: operator.into(),
            value,
        }
    }
}

/// Wide → long. Each operator column of each row that is neither a key nor
/// excluded, and holds a number, yields one record keyed by the row's period.
///
/// Empty and non-numeric cells produce nothing. With no key columns each row
/// is its own period (`PeriodKey::Row`). Output follows column order, then
/// row order.
pub fn reshape(
    rows: &[Row<'_>],
    key_columns: &[&str],
    exclude_columns: &[&str],
) -> Result<Vec<LongRecord>> {
    let mut out = Vec::new();

    for row in rows {
        let table = row.table();
        let mut key_cells = Vec::with_capacity(key_columns.len());
        for key in key_columns {
            let idx = table.require_column(key)?;
            key_cells.push(&row.cells()[idx]);
        }

        let period = match PeriodKey::from_key_cells(&key_cells, row.position()) {
            Some(p) => p,
            None => {
                warn!(
                    table = table.name(),
                    row = row.position(),
                    "row has an empty key column; skipped"
                );
                continue;
            }
        };

        for operator in &table.schema().operators {
            if key_columns.contains(&operator.as_str())
                || exclude_columns.contains(&operator.as_str())
            {
                continue;
            }
            match row.get(operator).and_then(Cell::as_number) {
                Some(value) => out.push(LongRecord::new(period.clone(), operator.as_str(), value)),
                None => trace!(%period, operator = operator.as_str(), "no numeric value"),
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::RawTable;
    use crate::schema::{normalize_table, NormalizedTable};
    use std::collections::BTreeSet;

    fn build(headers: &[&str], rows: Vec<Vec<Cell>>, meta: &[&str]) -> NormalizedTable {
        let raw = RawTable::new(
            "fixture",
            headers.iter().map(|h| h.to_string()).collect(),
            rows,
        );
        let meta: BTreeSet<String> = meta.iter().map(|s| s.to_string()).collect();
        normalize_table(&raw, &meta).expect("fixture normalizes")
    }

    #[test]
    fn synthetic_row_yields_only_numeric_non_excluded_values() -> anyhow::Result<()> {
        // notes is deliberately left out of the metadata set so that only the
        // exclusion list keeps it out
        let t = build(
            &["period", "category", "opA", "opB", "notes"],
            vec![vec![
                Cell::Number(2024.0),
                Cell::text("X"),
                Cell::Number(10.0),
                Cell::Empty,
                Cell::text("text"),
            ]],
            &["period"],
        );
        let rows: Vec<_> = t.rows().collect();

        let out = reshape(&rows, &["period"], &["category", "notes"])?;
        assert_eq!(out, vec![LongRecord::new(PeriodKey::Year(2024), "opa", 10.0)]);
        Ok(())
    }

    #[test]
    fn text_in_operator_column_is_skipped_without_exclusion() -> anyhow::Result<()> {
        let t = build(
            &["Time period", "Lumo", "Hull Trains"],
            vec![vec![Cell::Number(2024.0), Cell::text("[x]"), Cell::Number(7.5)]],
            &["time_period"],
        );
        let rows: Vec<_> = t.rows().collect();

        let out = reshape(&rows, &["time_period"], &[])?;
        assert_eq!(out, vec![LongRecord::new(PeriodKey::Year(2024), "hull_trains", 7.5)]);
        Ok(())
    }

    #[test]
    fn metadata_columns_never_become_operators() -> anyhow::Result<()> {
        let t = build(
            &["Time period", "Delay compensation", "Revision", "Lumo"],
            vec![vec![
                Cell::Number(2024.0),
                Cell::text("claims received"),
                Cell::Number(2.0),
                Cell::Number(1.0),
            ]],
            &["time_period", "delay_compensation", "revision"],
        );
        let rows: Vec<_> = t.rows().collect();

        let out = reshape(&rows, &["time_period"], &[])?;
        let ops: Vec<&str> = out.iter().map(|r| r.operator.as_str()).collect();
        assert_eq!(ops, vec!["lumo"]);
        Ok(())
    }

    #[test]
    fn order_is_columns_then_rows() -> anyhow::Result<()> {
        let t = build(
            &["Time period", "B op", "A op"],
            vec![
                vec![Cell::Number(2023.0), Cell::Number(1.0), Cell::Number(2.0)],
                vec![Cell::Number(2024.0), Cell::Number(3.0), Cell::Number(4.0)],
            ],
            &["time_period"],
        );
        let rows: Vec<_> = t.rows().collect();

        let out = reshape(&rows, &["time_period"], &[])?;
        let got: Vec<(PeriodKey, &str, f64)> = out
            .iter()
            .map(|r| (r.period.clone(), r.operator.as_str(), r.value))
            .collect();
        assert_eq!(
            got,
            vec![
                (PeriodKey::Year(2023), "b_op", 1.0),
                (PeriodKey::Year(2023), "a_op", 2.0),
                (PeriodKey::Year(2024), "b_op", 3.0),
                (PeriodKey::Year(2024), "a_op", 4.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn rows_without_key_columns_are_their_own_period() -> anyhow::Result<()> {
        let t = build(
            &["Delay compensation", "Lumo"],
            vec![
                vec![Cell::text("closed"), Cell::Number(90.0)],
                vec![Cell::text("closed"), Cell::Number(80.0)],
            ],
            &["delay_compensation"],
        );
        let rows: Vec<_> = t.rows().collect();

        let out = reshape(&rows, &[], &["delay_compensation"])?;
        assert_eq!(
            out,
            vec![
                LongRecord::new(PeriodKey::Row(0), "lumo", 90.0),
                LongRecord::new(PeriodKey::Row(1), "lumo", 80.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn empty_key_cell_skips_row_and_missing_key_column_errors() {
        let t = build(
            &["Time period", "Lumo"],
            vec![
                vec![Cell::Empty, Cell::Number(1.0)],
                vec![Cell::text("2022-23"), Cell::Number(2.0)],
            ],
            &["time_period"],
        );
        let rows: Vec<_> = t.rows().collect();

        let out = reshape(&rows, &["time_period"], &[]).expect("reshape succeeds");
        assert_eq!(
            out,
            vec![LongRecord::new(PeriodKey::Label("2022-23".into()), "lumo", 2.0)]
        );

        assert!(reshape(&rows, &["year"], &[]).is_err());
    }

    #[test]
    fn period_parsing_and_ordering() {
        assert_eq!(PeriodKey::from_cell(&Cell::Number(2024.0)), Some(PeriodKey::Year(2024)));
        assert_eq!(PeriodKey::from_cell(&Cell::text("2019")), Some(PeriodKey::Year(2019)));
        assert_eq!(
            PeriodKey::from_cell(&Cell::text("Apr 2023 to Mar 2024")),
            Some(PeriodKey::Label("Apr 2023 to Mar 2024".into()))
        );
        assert_eq!(PeriodKey::from_cell(&Cell::Empty), None);

        let mut keys = vec![
            PeriodKey::Row(0),
            PeriodKey::Label("b".into()),
            PeriodKey::Year(2024),
            PeriodKey::Year(2019),
        ];
        keys.sort();
        assert_eq!(keys[0], PeriodKey::Year(2019));
        assert_eq!(keys[3], PeriodKey::Row(0));
        assert_eq!(PeriodKey::Row(0).to_string(), "#1");
    }
}
