// src/reshape/filter.rs

use tracing::debug;

use super::long::PeriodKey;
use crate::error::Result;
use crate::schema::{NormalizedTable, Row};

/// Rows whose `category_column` holds exactly `key` (case-sensitive).
///
/// The comparison is exact against the loaded cell, and text cells are
/// trimmed at load time (`Cell::text`), so a source value of
/// `"claims received "` matches the key `"claims received"`. Inner spacing
/// and case are never adjusted.
///
/// No match is not an error: some categories only exist in one of the two
/// worksheets, and callers get an empty vec to render as an empty chart.
pub fn filter_by_category<'a>(
    table: &'a NormalizedTable,
    category_column: &str,
    key: &str,
) -> Result<Vec<Row<'a>>> {
    let idx = table.require_column(category_column)?;

    let rows: Vec<Row<'a>> = table
        .rows()
        .filter(|row| row.cells()[idx].as_text() == Some(key))
        .collect();

    if rows.is_empty() {
        debug!(table = table.name(), key, "no rows for category");
    }
    Ok(rows)
}

/// Keep only the rows whose `period_column` reads as `period`.
pub fn filter_by_period<'a>(
    rows: &[Row<'a>],
    period_column: &str,
    period: &PeriodKey,
) -> Vec<Row<'a>> {
    rows.iter()
        .filter(|row| {
            row.get(period_column)
                .and_then(PeriodKey::from_cell)
                .as_ref()
                == Some(period)
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::load::{Cell, RawTable};
    use crate::schema::normalize_table;
    use std::collections::BTreeSet;

    fn table() -> NormalizedTable {
        let raw = RawTable::new(
            "Annual_Data",
            vec!["Time period".into(), "Delay compensation".into(), "Lumo".into()],
            vec![
                vec![Cell::Number(2023.0), Cell::text("claims received"), Cell::Number(3.0)],
                vec![Cell::Number(2023.0), Cell::text("percent closed"), Cell::Number(91.0)],
                vec![Cell::Number(2024.0), Cell::text("claims received"), Cell::Number(4.0)],
                vec![Cell::Number(2024.0), Cell::text("Claims Received"), Cell::Number(9.0)],
            ],
        );
        let meta: BTreeSet<String> = ["time_period", "delay_compensation"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        normalize_table(&raw, &meta).expect("fixture normalizes")
    }

    #[test]
    fn exact_case_sensitive_match() -> anyhow::Result<()> {
        let t = table();
        let rows = filter_by_category(&t, "delay_compensation", "claims received")?;
        let positions: Vec<usize> = rows.iter().map(|r| r.position()).collect();
        assert_eq!(positions, vec![0, 2]);
        Ok(())
    }

    #[test]
    fn surrounding_whitespace_is_gone_after_load_but_case_is_not() -> anyhow::Result<()> {
        let raw = RawTable::new(
            "Periodic_Data",
            vec!["Delay compensation".into(), "Lumo".into()],
            vec![
                vec![Cell::text("claims received "), Cell::Number(1.0)],
                vec![Cell::text("  claims  received"), Cell::Number(2.0)],
                vec![Cell::text("Claims received"), Cell::Number(3.0)],
            ],
        );
        let meta: BTreeSet<String> = BTreeSet::from(["delay_compensation".to_string()]);
        let t = normalize_table(&raw, &meta)?;

        let rows = filter_by_category(&t, "delay_compensation", "claims received")?;
        let positions: Vec<usize> = rows.iter().map(|r| r.position()).collect();
        assert_eq!(positions, vec![0]);
        Ok(())
    }

    #[test]
    fn absent_key_is_empty_not_error() -> anyhow::Result<()> {
        let t = table();
        let rows = filter_by_category(&t, "delay_compensation", "claims rejected")?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[test]
    fn missing_category_column_is_config_error() {
        let t = table();
        let err = filter_by_category(&t, "measure", "claims received").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { ref column, .. } if column == "measure"));
    }

    #[test]
    fn period_filter_narrows_to_one_year() -> anyhow::Result<()> {
        let t = table();
        let claims = filter_by_category(&t, "delay_compensation", "claims received")?;
        let latest = filter_by_period(&claims, "time_period", &PeriodKey::Year(2024));
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].position(), 2);
        Ok(())
    }
}
