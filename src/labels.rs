// src/labels.rs

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// Short display names for the operators in the published tables, keyed by
/// normalized column identifier.
const KNOWN_OPERATORS: &[(&str, &str)] = &[
    ("great_britain", "Great Britain"),
    ("avanti_west_coast", "Avanti"),
    ("c2c", "c2c"),
    ("caledonian_sleeper", "Caledonian Sleeper"),
    ("chiltern_railways", "Chiltern"),
    ("crosscountry", "CrossCountry"),
    ("east_midlands_railway", "EMR"),
    ("elizabeth_line", "Elizabeth line"),
    ("gatwick_express", "Gatwick Express"),
    ("grand_central", "Grand Central"),
    ("great_northern", "Great Northern"),
    ("great_western_railway", "GWR"),
    ("greater_anglia", "Greater Anglia"),
    ("govia_thameslink_railway", "GTR"),
    ("heathrow_express", "Heathrow Express"),
    ("hull_trains", "Hull Trains"),
    ("island_line", "Island Line"),
    ("london_north_eastern_railway", "LNER"),
    ("london_overground", "Overground"),
    ("lumo", "Lumo"),
    ("merseyrail", "Merseyrail"),
    ("northern_trains", "Northern"),
    ("scotrail", "ScotRail"),
    ("southeastern", "Southeastern"),
    ("south_western_railway", "SWR"),
    ("transpennine_express", "TPE"),
    ("transport_for_wales", "TfW"),
    ("west_midlands_trains", "WMT"),
];

static KNOWN: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| KNOWN_OPERATORS.iter().copied().collect());

/// Operator id → display label, with optional per-run overrides.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    overrides: HashMap<String, String>,
}

impl Labels {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self { overrides }
    }

    /// Display label for `operator`. Unknown ids are shown as-is.
    pub fn get<'a>(&'a self, operator: &'a str) -> &'a str {
        if let Some(label) = self.overrides.get(operator) {
            return label;
        }
        match KNOWN.get(operator) {
            Some(label) => *label,
            None => {
                debug!(operator, "no display label; using identifier");
                operator
            }
        }
    }
}
