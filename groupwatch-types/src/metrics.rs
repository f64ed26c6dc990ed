//! Derived metrics computed from a snapshot.

use core::fmt;

use crate::PartitionObservation;

/// Health signals derived from one snapshot (and its predecessor).
///
/// A fresh value replaces the previous one on every snapshot; it is never
/// updated in place. Degenerate input (no partitions, no members) yields
/// zeros rather than errors, so `DerivedMetrics::default()` is also the
/// "no data yet" value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedMetrics {
    pub total_lag: i64,
    pub mean_lag: f64,
    pub p50_lag: i64,
    pub p95_lag: i64,
    pub max_lag: i64,
    pub partition_count: usize,

    /// Gini coefficient over per-member partition counts (0 = even).
    pub fairness_gini: f64,

    /// Partitions with lag whose committed offset did not move since the
    /// previous snapshot.
    pub stuck_partitions: Vec<PartitionObservation>,

    pub is_rebalancing: bool,
    pub has_lag_spike: bool,

    /// Per-topic rollups, highest total lag first.
    pub topics: Vec<TopicRollup>,

    /// Data-quality problems found in the snapshot.
    pub warnings: Vec<DataWarning>,
}

impl DerivedMetrics {
    /// Number of stuck partitions.
    pub fn stuck_count(&self) -> usize {
        self.stuck_partitions.len()
    }

    /// Look up the rollup for a topic.
    pub fn topic(&self, topic: &str) -> Option<&TopicRollup> {
        self.topics.iter().find(|t| t.topic == topic)
    }
}

/// Lag aggregated to the topic level.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TopicRollup {
    pub topic: String,
    pub partition_count: usize,
    pub total_lag: i64,
    pub avg_lag: f64,
    pub max_lag: i64,
}

/// A data-quality problem in a snapshot. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataWarning {
    /// A partition is assigned to a member missing from the member list.
    UnknownMember {
        topic: String,
        partition: u32,
        member_id: String,
    },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::UnknownMember {
                topic,
                partition,
                member_id,
            } => write!(
                f,
                "{}/{} assigned to unknown member {}",
                topic, partition, member_id
            ),
        }
    }
}
