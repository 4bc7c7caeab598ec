// src/schema/normalize.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, instrument};

use super::table::{NormalizedTable, TableSchema};
use crate::error::{PipelineError, Result};
use crate::load::RawTable;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("separator regex is valid"));

/// Canonical column identifier: ASCII-lowercased, every run of characters
/// other than `a-z0-9` collapsed to one `_`, outer `_` trimmed.
///
/// `"Avanti West Coast"` → `avanti_west_coast`, `"c2c (Trenitalia)"` → `c2c_trenitalia`.
pub fn normalize(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    SEPARATORS
        .replace_all(&lower, "_")
        .trim_matches('_')
        .to_string()
}

/// Rewrite every header of `raw` to its canonical name and split the columns
/// into metadata (`metadata` set) and operator columns.
///
/// Two columns landing on the same canonical name is an error, as is a header
/// with no letters or digits unless the whole column is blank padding.
#[instrument(level = "debug", skip(raw, metadata), fields(table = %raw.name))]
pub fn normalize_table(raw: &RawTable, metadata: &BTreeSet<String>) -> Result<NormalizedTable> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(raw.headers.len());
    let mut kept: Vec<usize> = Vec::with_capacity(raw.headers.len());
    let mut columns: Vec<String> = Vec::with_capacity(raw.headers.len());

    for (idx, header) in raw.headers.iter().enumerate() {
        let canonical = normalize(header);

        if canonical.is_empty() {
            if raw.column_is_blank(idx) {
                debug!(index = idx, "dropping blank padding column");
                continue;
            }
            return Err(PipelineError::EmptyColumnName {
                table: raw.name.clone(),
                index: idx,
                raw: header.clone(),
            });
        }

        if let Some(first) = seen.get(&canonical) {
            return Err(PipelineError::ColumnCollision {
                table: raw.name.clone(),
                first: first.to_string(),
                second: header.clone(),
                canonical,
            });
        }

        seen.insert(canonical.clone(), header.as_str());
        kept.push(idx);
        columns.push(canonical);
    }

    let rows: Vec<_> = raw
        .rows
        .iter()
        .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
        .collect();

    let schema = TableSchema::split(&columns, metadata);
    debug!(
        metadata = ?schema.metadata,
        operators = schema.operators.len(),
        "normalized"
    );

    Ok(NormalizedTable::new(raw.name.clone(), columns, rows, schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::Cell;

    /// Headers as they appear across both worksheets of the published tables.
    const HEADERS: &[&str] = &[
        "Time period",
        "Delay compensation",
        "Great Britain",
        "Avanti West Coast",
        "c2c",
        "Caledonian Sleeper",
        "Chiltern Railways",
        "CrossCountry",
        "East Midlands Railway",
        "Elizabeth line",
        "Grand Central",
        "Great Western Railway",
        "Greater Anglia",
        "Govia Thameslink Railway",
        "Heathrow Express",
        "Hull Trains",
        "London North Eastern Railway",
        "London Overground",
        "Lumo",
        "Merseyrail",
        "Northern Trains",
        "ScotRail",
        "Southeastern",
        "South Western Railway",
        "TransPennine Express",
        "Transport for Wales",
        "West Midlands Trains",
    ];

    fn meta() -> BTreeSet<String> {
        ["time_period", "delay_compensation"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn collapses_separators_and_lowercases() {
        assert_eq!(normalize("Avanti West Coast"), "avanti_west_coast");
        assert_eq!(normalize("  Time  period "), "time_period");
        assert_eq!(normalize("c2c (Trenitalia)"), "c2c_trenitalia");
        assert_eq!(normalize("% closed -- within 20 days"), "closed_within_20_days");
        assert_eq!(normalize("Transport for Wales / TfW"), "transport_for_wales_tfw");
        assert_eq!(normalize("Île-de-France"), "le_de_france");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let extra = ["__x__", "A--B", "already_canonical", "Mixed CASE 42", ""];
        for raw in HEADERS.iter().chain(extra.iter()) {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn real_header_set_has_no_collisions() {
        let unique: BTreeSet<String> = HEADERS.iter().map(|h| normalize(h)).collect();
        assert_eq!(unique.len(), HEADERS.len());
    }

    #[test]
    fn normalize_table_splits_metadata_from_operators() -> anyhow::Result<()> {
        let raw = RawTable::new(
            "Annual_Data",
            vec![
                "Time period".into(),
                "Delay compensation".into(),
                "Great Britain".into(),
                "Avanti West Coast".into(),
            ],
            vec![vec![
                Cell::Number(2024.0),
                Cell::Text("claims received".into()),
                Cell::Number(220.0),
                Cell::Number(12.0),
            ]],
        );

        let t = normalize_table(&raw, &meta())?;
        assert_eq!(
            t.columns(),
            &["time_period", "delay_compensation", "great_britain", "avanti_west_coast"]
        );
        assert_eq!(t.schema().operators, vec!["great_britain", "avanti_west_coast"]);
        assert!(t.schema().is_metadata("time_period"));
        assert_eq!(t.len(), 1);
        Ok(())
    }

    #[test]
    fn colliding_headers_fail_the_load() {
        let raw = RawTable::new(
            "Periodic_Data",
            vec!["Delay compensation".into(), "Hull Trains".into(), "hull-trains".into()],
            vec![],
        );

        match normalize_table(&raw, &meta()) {
            Err(PipelineError::ColumnCollision {
                first,
                second,
                canonical,
                ..
            }) => {
                assert_eq!(first, "Hull Trains");
                assert_eq!(second, "hull-trains");
                assert_eq!(canonical, "hull_trains");
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn repeated_header_is_a_collision() {
        let raw = RawTable::new(
            "Periodic_Data",
            vec!["Lumo".into(), "Lumo".into()],
            vec![],
        );
        assert!(matches!(
            normalize_table(&raw, &meta()),
            Err(PipelineError::ColumnCollision { .. })
        ));
    }

    #[test]
    fn blank_padding_column_is_dropped_but_unnamed_data_is_not() -> anyhow::Result<()> {
        let padded = RawTable::new(
            "Annual_Data",
            vec!["Time period".into(), "".into()],
            vec![vec![Cell::Number(2024.0), Cell::Empty]],
        );
        let t = normalize_table(&padded, &meta())?;
        assert_eq!(t.columns(), &["time_period"]);
        assert_eq!(t.row(0).map(|r| r.cells().len()), Some(1));

        let unnamed = RawTable::new(
            "Annual_Data",
            vec!["Time period".into(), " ** ".into()],
            vec![vec![Cell::Number(2024.0), Cell::Number(5.0)]],
        );
        assert!(matches!(
            normalize_table(&unnamed, &meta()),
            Err(PipelineError::EmptyColumnName { index: 1, .. })
        ));
        Ok(())
    }
}
