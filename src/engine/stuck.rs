//! Stuck-partition detection against the previous snapshot.

use std::collections::HashMap;

use groupwatch_types::{DerivedMetrics, GroupSnapshot, PartitionObservation};

/// What the engine remembers about the previous snapshot.
///
/// Owned by the session and handed to [`compute`](super::compute) so the
/// engine itself stays stateless.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Baseline {
    timestamp_ms: u64,
    p95_lag: i64,
    /// topic -> partition -> committed offset
    committed: HashMap<String, HashMap<u32, Option<i64>>>,
}

impl Baseline {
    /// Capture the parts of a processed snapshot the next computation needs.
    pub fn capture(snapshot: &GroupSnapshot, metrics: &DerivedMetrics) -> Self {
        let mut committed: HashMap<String, HashMap<u32, Option<i64>>> = HashMap::new();
        for p in &snapshot.partitions {
            committed
                .entry(p.topic.clone())
                .or_default()
                .insert(p.partition, p.committed_offset);
        }

        Self {
            timestamp_ms: snapshot.timestamp_ms,
            p95_lag: metrics.p95_lag,
            committed,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    pub fn p95_lag(&self) -> i64 {
        self.p95_lag
    }

    /// Committed offset recorded for a partition, if it was known.
    pub fn committed_offset(&self, topic: &str, partition: u32) -> Option<i64> {
        self.committed.get(topic)?.get(&partition).copied().flatten()
    }
}

/// Partitions with lag whose committed offset has not advanced.
///
/// Requires a baseline at least `min_interval_ms` older than `current`.
/// Partitions with an unknown committed offset on either side are never
/// flagged.
pub fn stuck_partitions(
    current: &GroupSnapshot,
    baseline: Option<&Baseline>,
    min_interval_ms: u64,
) -> Vec<PartitionObservation> {
    let Some(baseline) = baseline else {
        return Vec::new();
    };

    let elapsed = current.timestamp_ms.saturating_sub(baseline.timestamp_ms);
    if elapsed < min_interval_ms {
        return Vec::new();
    }

    current
        .partitions
        .iter()
        .filter(|p| {
            p.effective_lag() > 0
                && match (p.committed_offset, baseline.committed_offset(&p.topic, p.partition)) {
                    (Some(now), Some(before)) => now == before,
                    _ => false,
                }
        })
        .cloned()
        .collect()
}
