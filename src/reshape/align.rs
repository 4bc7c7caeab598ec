// src/reshape/align.rs

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::long::{LongRecord, PeriodKey};
use crate::error::{PipelineError, Result};

/// A claims observation paired with the closure rate for the same period and
/// operator, if one exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRecord {
    pub period: PeriodKey,
    pub operator: String,
    pub claims: Option<f64>,
    pub closed_pct: Option<f64>,
}

/// Left-outer join on `(period, operator)`.
///
/// Every left record comes out exactly once, in left order. A left record with
/// no partner gets `closed_pct: None`. A key seen twice on either side is a
/// data-integrity error; there is no tie-break.
pub fn join(left: &[LongRecord], right: &[LongRecord]) -> Result<Vec<JoinedRecord>> {
    let mut right_index: HashMap<(&PeriodKey, &str), f64> = HashMap::with_capacity(right.len());
    for r in right {
        if right_index
            .insert((&r.period, r.operator.as_str()), r.value)
            .is_some()
        {
            return Err(collision("right", r));
        }
    }

    let mut seen: HashSet<(&PeriodKey, &str)> = HashSet::with_capacity(left.len());
    let mut out = Vec::with_capacity(left.len());
    let mut matched = 0usize;

    for l in left {
        let key = (&l.period, l.operator.as_str());
        if !seen.insert(key) {
            return Err(collision("left", l));
        }

        let closed_pct = right_index.get(&key).copied();
        if closed_pct.is_some() {
            matched += 1;
        }
        out.push(JoinedRecord {
            period: l.period.clone(),
            operator: l.operator.clone(),
            claims: Some(l.value),
            closed_pct,
        });
    }

    debug!(
        left = left.len(),
        right = right.len(),
        matched,
        "aligned"
    );
    Ok(out)
}

/// Drop the records for the national aggregate. Applied after `join` so the
/// aggregate never influences which operators match.
pub fn drop_aggregate(records: Vec<JoinedRecord>, aggregate: &str) -> Vec<JoinedRecord> {
    records
        .into_iter()
        .filter(|r| r.operator != aggregate)
        .collect()
}

fn collision(side: &'static str, r: &LongRecord) -> PipelineError {
    PipelineError::JoinKeyCollision {
        side,
        period: r.period.to_string(),
        operator: r.operator.clone(),
    }
}
