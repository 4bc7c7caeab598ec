// src/config.rs

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::figures::Theme;
use crate::schema::normalize;

/// Everything the run needs. Every field has a default, so an empty file (or
/// no file at all) reproduces the standard figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Source workbook (`.xlsx`, `.xls` or `.ods`).
    pub input: PathBuf,
    /// Composite SVG written at the end of the run.
    pub output: PathBuf,
    pub annual_sheet: String,
    pub periodic_sheet: String,
    /// Reporting-period column of the annual sheet.
    pub period_column: String,
    /// Row-type discriminator column present in both sheets.
    pub category_column: String,
    pub claims_category: String,
    pub closed_category: String,
    /// National-aggregate operator id.
    pub aggregate: String,
    /// Further non-operator columns (notes, revision flags, ...).
    pub extra_metadata: Vec<String>,
    /// Display-label overrides keyed by operator id.
    pub labels: HashMap<String, String>,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/delay-compensation.xlsx"),
            output: PathBuf::from("figures/delay_compensation.svg"),
            annual_sheet: "Annual_Data".into(),
            periodic_sheet: "Periodic_Data".into(),
            period_column: "time_period".into(),
            category_column: "delay_compensation".into(),
            claims_category: "Number of delay compensation claims received".into(),
            closed_category: "Percentage of delay compensation claims closed within 20 working days"
                .into(),
            aggregate: "great_britain".into(),
            extra_metadata: Vec::new(),
            labels: HashMap::new(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    /// Read a config file; `.yaml`/`.yml` and `.json` are accepted.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;

        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        let cfg: Config = match ext.as_deref() {
            Some("yaml") | Some("yml") => {
                if text.trim().is_empty() {
                    Config::default()
                } else {
                    serde_yaml::from_str(&text).with_context(|| format!("parsing {:?}", path))?
                }
            }
            Some("json") => {
                serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))?
            }
            _ => {
                return Err(anyhow!(PipelineError::Config {
                    path: path.to_path_buf(),
                    message: "expected a .yaml, .yml or .json file".into(),
                }))
            }
        };

        let cfg = cfg.canonicalized();
        cfg.validate(path)?;
        info!(path = %path.display(), "config loaded");
        debug!(?cfg, "effective config");
        Ok(cfg)
    }

    /// Column and operator names in the config may be written the way they
    /// appear in the sheet; rewrite them to canonical ids.
    pub fn canonicalized(mut self) -> Self {
        self.period_column = normalize(&self.period_column);
        self.category_column = normalize(&self.category_column);
        self.aggregate = normalize(&self.aggregate);
        self.extra_metadata = self.extra_metadata.iter().map(|c| normalize(c)).collect();
        self.labels = self
            .labels
            .into_iter()
            .map(|(k, v)| (normalize(&k), v))
            .collect();
        self
    }

    fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        let fail = |message: String| PipelineError::Config {
            path: path.to_path_buf(),
            message,
        };
        for (field, value) in [
            ("period_column", &self.period_column),
            ("category_column", &self.category_column),
            ("aggregate", &self.aggregate),
        ] {
            if value.is_empty() {
                return Err(fail(format!("`{}` has no letters or digits", field)));
            }
        }
        if self.period_column == self.category_column {
            return Err(fail("period and category columns must differ".into()));
        }
        if self.theme.width == 0 || self.theme.height == 0 {
            return Err(fail("theme width and height must be positive".into()));
        }
        if self.theme.palette.is_empty() {
            return Err(fail("theme palette is empty".into()));
        }
        Ok(())
    }

    /// Non-operator columns: the period and category columns plus any extras.
    pub fn metadata_columns(&self) -> BTreeSet<String> {
        let mut cols: BTreeSet<String> = self.extra_metadata.iter().cloned().collect();
        cols.insert(self.period_column.clone());
        cols.insert(self.category_column.clone());
        cols
    }
}
