// Multi-source consensus: one weighted, outlier-trimmed record per player.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::{ConsensusConfig, IdentityPolicy};
use crate::names::{NameKey, NameMatcher};
use crate::position::Position;
use crate::valuation::projections::{SourceTable, StatField, StatLine};

/// Scale factor turning a median absolute deviation into a normal-consistent
/// standard deviation estimate.
const MAD_TO_SIGMA: f64 = 1.4826;

/// One merged player.
#[derive(Debug, Clone)]
pub struct ConsensusRecord {
    pub key: NameKey,
    pub name: String,
    pub position: Position,
    pub team: Option<String>,
    pub stats: StatLine,
    /// Number of sources that listed this player.
    pub source_count: usize,
}

/// Merged table; `has_projection_stats` is true when any input table carried
/// real projection columns.
#[derive(Debug, Clone, Default)]
pub struct ConsensusTable {
    pub records: Vec<ConsensusRecord>,
    pub has_projection_stats: bool,
}

/// A (value, weight) observation of one field from one source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub value: f64,
    pub weight: f64,
}

// ---------------------------------------------------------------------------
// Field-level statistics
// ---------------------------------------------------------------------------

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Drop observations more than `threshold` standard deviations from the
/// center. Applied only with three or more observations.
///
/// Center and spread come from the median and the scaled median absolute
/// deviation, so a single wild value cannot inflate the spread enough to hide
/// itself. When more than half the observations agree exactly (MAD of zero)
/// the plain mean and population standard deviation are used instead.
///
/// `threshold` is therefore in MAD-sigma units, which is stricter than a
/// mean/stddev rule when most sources agree closely: for 100, 101 and 130 the
/// spread is 1.48, so 130 is dropped at 2.0 even though it sits within two
/// population standard deviations (13.9) of the mean.
pub fn filter_outliers(obs: &[Observation], threshold: f64) -> Vec<Observation> {
    if obs.len() < 3 {
        return obs.to_vec();
    }
    let values: Vec<f64> = obs.iter().map(|o| o.value).collect();

    let center = median(&values);
    let deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    let mad = median(&deviations);

    let (center, sigma) = if mad > 0.0 {
        (center, mad * MAD_TO_SIGMA)
    } else {
        (mean(&values), std_dev(&values))
    };
    if sigma <= 0.0 {
        return obs.to_vec();
    }

    obs.iter()
        .copied()
        .filter(|o| (o.value - center).abs() <= threshold * sigma)
        .collect()
}

/// Weighted mean of observations, optionally outlier-trimmed. Empty input or
/// zero total weight yields 0.0.
pub fn consensus_value(obs: &[Observation], outlier_threshold: Option<f64>) -> f64 {
    let kept = match outlier_threshold {
        Some(t) => filter_outliers(obs, t),
        None => obs.to_vec(),
    };
    let total_weight: f64 = kept.iter().map(|o| o.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    kept.iter().map(|o| o.value * o.weight).sum::<f64>() / total_weight
}

// ---------------------------------------------------------------------------
// Table merge
// ---------------------------------------------------------------------------

struct Group {
    key: NameKey,
    /// (table index, record index), one per source, in table order.
    members: Vec<(usize, usize)>,
}

/// Merge normalized source tables into one consensus table.
///
/// Players are grouped by the matcher's key, in first-appearance order. A
/// source listing the same player twice contributes its first row only.
/// Fields no contributing source supplied stay absent (read as 0.0).
pub fn merge_sources(
    tables: &[SourceTable],
    config: &ConsensusConfig,
    matcher: &dyn NameMatcher,
) -> ConsensusTable {
    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<NameKey, usize> = HashMap::new();

    for (ti, table) in tables.iter().enumerate() {
        for (ri, record) in table.records.iter().enumerate() {
            let key = matcher.key(&record.name);
            let gi = *index.entry(key.clone()).or_insert_with(|| {
                groups.push(Group {
                    key,
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            let group = &mut groups[gi];
            if group.members.iter().any(|(t, _)| *t == ti) {
                debug!(
                    "source {} lists {} more than once; keeping the first row",
                    table.source, record.name
                );
                continue;
            }
            group.members.push((ti, ri));
        }
    }

    let mut records = Vec::with_capacity(groups.len());
    let mut gated = 0usize;
    for group in groups {
        if group.members.len() < config.min_sources {
            gated += 1;
            continue;
        }

        let identity = match config.identity_policy {
            IdentityPolicy::FirstSource => group.members[0],
            IdentityPolicy::HighestWeight => {
                let mut best = group.members[0];
                for &(ti, ri) in &group.members[1..] {
                    if tables[ti].weight > tables[best.0].weight {
                        best = (ti, ri);
                    }
                }
                best
            }
        };
        let id_record = &tables[identity.0].records[identity.1];

        let mut per_field: HashMap<StatField, Vec<Observation>> = HashMap::new();
        for &(ti, ri) in &group.members {
            let table = &tables[ti];
            for (field, value) in table.records[ri].stats.iter() {
                per_field.entry(field).or_default().push(Observation {
                    value,
                    weight: table.weight,
                });
            }
        }
        let stats: StatLine = per_field
            .into_iter()
            .map(|(field, obs)| (field, consensus_value(&obs, config.outlier_threshold)))
            .collect();

        records.push(ConsensusRecord {
            key: group.key,
            name: id_record.name.clone(),
            position: id_record.position,
            team: id_record.team.clone(),
            stats,
            source_count: group.members.len(),
        });
    }

    info!(
        "consensus: {} players from {} sources ({} below min_sources={})",
        records.len(),
        tables.len(),
        gated,
        config.min_sources
    );

    ConsensusTable {
        records,
        has_projection_stats: tables.iter().any(|t| t.has_projection_stats),
    }
}
