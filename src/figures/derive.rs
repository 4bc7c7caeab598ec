// src/figures/derive.rs

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::reshape::{
    drop_aggregate, filter_by_category, filter_by_period, join, reshape, JoinedRecord, LongRecord,
    PeriodKey,
};
use crate::schema::NormalizedTable;

/// Figure 1: national claims per period, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NationalTrend {
    pub points: Vec<(PeriodKey, f64)>,
    /// Most recent period with a claims row, whether or not the aggregate has a value.
    pub latest: Option<PeriodKey>,
}

/// Figure 2: claims per operator in the latest period, largest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatorBars {
    pub period: Option<PeriodKey>,
    pub bars: Vec<LongRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorGroup {
    pub operator: String,
    pub values: Vec<f64>,
}

/// Figure 3: per-operator spread of the periodic closure rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClosureDistribution {
    /// Operators in first-seen order; every group has at least one value.
    pub groups: Vec<OperatorGroup>,
}

/// Figure 4: claims volume against closure rate, per operator and period.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VolumeVsEfficiency {
    pub records: Vec<JoinedRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Figures {
    pub trend: NationalTrend,
    pub bars: OperatorBars,
    pub distribution: ClosureDistribution,
    pub scatter: VolumeVsEfficiency,
}

fn claims_records(annual: &NormalizedTable, cfg: &Config) -> Result<Vec<LongRecord>> {
    let rows = filter_by_category(annual, &cfg.category_column, &cfg.claims_category)?;
    reshape(&rows, &[cfg.period_column.as_str()], &[cfg.category_column.as_str()])
}

/// Two claims rows for the same period are a data-integrity error, as they
/// are for the volume/efficiency join.
#[instrument(level = "debug", skip_all)]
pub fn national_trend(annual: &NormalizedTable, cfg: &Config) -> Result<NationalTrend> {
    let rows = filter_by_category(annual, &cfg.category_column, &cfg.claims_category)?;
    let period_idx = annual.require_column(&cfg.period_column)?;

    let latest = rows
        .iter()
        .filter_map(|r| PeriodKey::from_cell(&r.cells()[period_idx]))
        .max();

    let mut points: Vec<(PeriodKey, f64)> =
        reshape(&rows, &[cfg.period_column.as_str()], &[cfg.category_column.as_str()])?
            .into_iter()
            .filter(|r| r.operator == cfg.aggregate)
            .map(|r| (r.period, r.value))
            .collect();
    points.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(w) = points.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(PipelineError::DuplicatePeriod {
            series: cfg.aggregate.clone(),
            period: w[0].0.to_string(),
        });
    }

    Ok(NationalTrend { points, latest })
}

#[instrument(level = "debug", skip(annual, cfg))]
pub fn latest_operator_bars(
    annual: &NormalizedTable,
    cfg: &Config,
    latest: Option<&PeriodKey>,
) -> Result<OperatorBars> {
    let Some(latest) = latest else {
        return Ok(OperatorBars::default());
    };

    let rows = filter_by_category(annual, &cfg.category_column, &cfg.claims_category)?;
    let rows = filter_by_period(&rows, &cfg.period_column, latest);

    // the aggregate stays in: only the volume/efficiency view drops it
    let mut bars = reshape(&rows, &[cfg.period_column.as_str()], &[cfg.category_column.as_str()])?;
    bars.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    Ok(OperatorBars {
        period: Some(latest.clone()),
        bars,
    })
}

/// Periodic rows carry no period column, so every matching row is its own
/// observation and values are concatenated per operator.
#[instrument(level = "debug", skip_all)]
pub fn closure_distribution(periodic: &NormalizedTable, cfg: &Config) -> Result<ClosureDistribution> {
    let rows = filter_by_category(periodic, &cfg.category_column, &cfg.closed_category)?;
    let records = reshape(&rows, &[], &[cfg.category_column.as_str()])?;

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<OperatorGroup> = Vec::new();
    for r in records {
        let slot = *index.entry(r.operator.clone()).or_insert_with(|| {
            groups.push(OperatorGroup {
                operator: r.operator.clone(),
                values: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].values.push(r.value);
    }

    Ok(ClosureDistribution { groups })
}

#[instrument(level = "debug", skip_all)]
pub fn volume_vs_efficiency(annual: &NormalizedTable, cfg: &Config) -> Result<VolumeVsEfficiency> {
    let claims = claims_records(annual, cfg)?;
    let closed_rows = filter_by_category(annual, &cfg.category_column, &cfg.closed_category)?;
    let closed = reshape(&closed_rows, &[cfg.period_column.as_str()], &[cfg.category_column.as_str()])?;

    let joined = join(&claims, &closed)?;
    let records = drop_aggregate(joined, &cfg.aggregate);
    Ok(VolumeVsEfficiency { records })
}

/// Build all four derived tables. The trend and bars share the latest period;
/// the other two are independent and run alongside on the rayon pool.
#[instrument(level = "info", skip_all)]
pub fn derive_all(
    annual: &NormalizedTable,
    periodic: &NormalizedTable,
    cfg: &Config,
) -> Result<Figures> {
    let (trend_and_bars, (distribution, scatter)) = rayon::join(
        || -> Result<(NationalTrend, OperatorBars)> {
            let trend = national_trend(annual, cfg)?;
            let bars = latest_operator_bars(annual, cfg, trend.latest.as_ref())?;
            Ok((trend, bars))
        },
        || {
            rayon::join(
                || closure_distribution(periodic, cfg),
                || volume_vs_efficiency(annual, cfg),
            )
        },
    );
    let (trend, bars) = trend_and_bars?;
    let figures = Figures {
        trend,
        bars,
        distribution: distribution?,
        scatter: scatter?,
    };

    info!(
        trend_points = figures.trend.points.len(),
        latest = %figures
            .trend
            .latest
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".into()),
        bars = figures.bars.bars.len(),
        box_groups = figures.distribution.groups.len(),
        scatter_points = figures.scatter.records.len(),
        "derived figures"
    );
    Ok(figures)
}
