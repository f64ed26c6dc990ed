//! Metrics engine: derived health signals from a group snapshot.
//!
//! Everything here is a pure function of its arguments. The previous
//! snapshot is represented by a [`Baseline`] that the caller owns and
//! passes in, so computing twice from the same `(baseline, snapshot)` pair
//! yields identical results.
//!
//! ## Submodules
//!
//! - [`lag`]: Lag distribution (total, mean, nearest-rank percentiles, max)
//! - [`fairness`]: Gini coefficient over per-member partition counts
//! - [`stuck`]: Stuck-partition detection and the [`Baseline`] it compares against
//! - [`rollup`]: Per-topic aggregation
//!
//! ## Data Flow
//!
//! ```text
//! GroupSnapshot ──┬──▶ lag_stats ─────────┐
//!                 ├──▶ fairness_gini ─────┤
//! Baseline ───────┼──▶ stuck_partitions ──┼──▶ DerivedMetrics
//!                 ├──▶ topic_rollups ─────┤
//!                 └──▶ lag spike / flags ─┘
//! ```

pub mod fairness;
pub mod lag;
pub mod rollup;
pub mod stuck;

use std::collections::HashSet;
use std::fmt;

use groupwatch_types::{DataWarning, DerivedMetrics, GroupSnapshot};
use serde::{Deserialize, Serialize};

pub use fairness::{fairness_gini, gini};
pub use lag::{lag_stats, nearest_rank_index, percentile, LagStats};
pub use rollup::topic_rollups;
pub use stuck::{stuck_partitions, Baseline};

/// Tunables for the derived signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// p95 lag above this multiple of the previous p95 is a spike.
    pub lag_spike_multiplier: f64,
    /// p95 lag above this absolute value is a spike regardless of history.
    pub lag_spike_floor: i64,
    /// Minimum time between snapshots before a partition can be called stuck.
    pub stuck_min_interval_ms: u64,
    /// Allowed difference between server and client fairness figures.
    pub gini_tolerance: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            lag_spike_multiplier: 3.0,
            lag_spike_floor: 10_000,
            stuck_min_interval_ms: 5_000,
            gini_tolerance: 0.01,
        }
    }
}

/// Compute derived metrics for `current`, comparing against `baseline`.
pub fn compute(
    current: &GroupSnapshot,
    baseline: Option<&Baseline>,
    config: &MetricsConfig,
) -> DerivedMetrics {
    let stats = lag_stats(&current.partitions);

    DerivedMetrics {
        total_lag: stats.total,
        mean_lag: stats.mean,
        p50_lag: stats.p50,
        p95_lag: stats.p95,
        max_lag: stats.max,
        partition_count: current.partitions.len(),
        fairness_gini: fairness_gini(&current.members),
        stuck_partitions: stuck_partitions(current, baseline, config.stuck_min_interval_ms),
        is_rebalancing: current.state.is_rebalancing(),
        has_lag_spike: is_lag_spike(stats.p95, baseline.map(Baseline::p95_lag), config),
        topics: topic_rollups(&current.partitions),
        warnings: data_warnings(current),
    }
}

/// Relative spikes need a non-zero previous p95; the absolute floor always applies.
fn is_lag_spike(p95: i64, previous_p95: Option<i64>, config: &MetricsConfig) -> bool {
    if p95 > config.lag_spike_floor {
        return true;
    }
    match previous_p95 {
        Some(prev) if prev > 0 => p95 as f64 > config.lag_spike_multiplier * prev as f64,
        _ => false,
    }
}

/// Partitions assigned to members that are not in the member list.
pub fn data_warnings(snapshot: &GroupSnapshot) -> Vec<DataWarning> {
    let known: HashSet<&str> = snapshot.members.iter().map(|m| m.member_id.as_str()).collect();

    snapshot
        .partitions
        .iter()
        .filter_map(|p| {
            let member = p.assigned_member_id.as_deref()?;
            if known.contains(member) {
                return None;
            }
            Some(DataWarning::UnknownMember {
                topic: p.topic.clone(),
                partition: p.partition,
                member_id: member.to_string(),
            })
        })
        .collect()
}

/// A server-reported figure that disagrees with the client's own.
#[derive(Debug, Clone, PartialEq)]
pub enum Discrepancy {
    Fairness { reported: f64, computed: f64 },
    StuckCount { reported: u32, computed: usize },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::Fairness { reported, computed } => write!(
                f,
                "server fairness {:.3} differs from computed {:.3}",
                reported, computed
            ),
            Discrepancy::StuckCount { reported, computed } => write!(
                f,
                "server reports {} stuck partitions, computed {}",
                reported, computed
            ),
        }
    }
}

/// Compare the backend's own figures, when present, against `metrics`.
///
/// The client-side values stay authoritative; discrepancies are only reported.
pub fn reconcile(
    snapshot: &GroupSnapshot,
    metrics: &DerivedMetrics,
    config: &MetricsConfig,
) -> Vec<Discrepancy> {
    let mut out = Vec::new();

    if let Some(reported) = snapshot.fairness_gini {
        if (reported - metrics.fairness_gini).abs() > config.gini_tolerance {
            out.push(Discrepancy::Fairness {
                reported,
                computed: metrics.fairness_gini,
            });
        }
    }

    if let Some(reported) = snapshot.stuck_count {
        if reported as usize != metrics.stuck_count() {
            out.push(Discrepancy::StuckCount {
                reported,
                computed: metrics.stuck_count(),
            });
        }
    }

    out
}
