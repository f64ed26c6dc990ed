//! GroupSnapshot - a point-in-time view of one consumer group.

use core::fmt;

use crate::{MemberObservation, PartitionBuilder, PartitionObservation};

/// Coordinator-reported state of a consumer group.
///
/// Any state name the client does not recognise decodes as `Unknown`
/// so newer brokers never break the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupState {
    Stable,
    PreparingRebalance,
    CompletingRebalance,
    Empty,
    Dead,
    #[default]
    #[cfg_attr(feature = "serde", serde(other))]
    Unknown,
}

impl GroupState {
    /// True while partitions are being reassigned.
    pub fn is_rebalancing(&self) -> bool {
        matches!(self, GroupState::PreparingRebalance | GroupState::CompletingRebalance)
    }

    /// Returns the display label for this state.
    pub fn label(&self) -> &'static str {
        match self {
            GroupState::Stable => "Stable",
            GroupState::PreparingRebalance => "PreparingRebalance",
            GroupState::CompletingRebalance => "CompletingRebalance",
            GroupState::Empty => "Empty",
            GroupState::Dead => "Dead",
            GroupState::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A point-in-time snapshot of a consumer group.
///
/// This is the unit of truth delivered over the live feed. Every non-null
/// `assigned_member_id` should name an entry in `members`; violations are
/// tolerated and reported as data-quality warnings by the metrics engine.
///
/// The backend may attach its own `fairness_gini` and `stuck_count`. They
/// are carried for reconciliation only; clients compute their own figures.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupSnapshot {
    /// Unix timestamp in milliseconds when this snapshot was taken.
    pub timestamp_ms: u64,

    pub cluster_id: String,

    pub group_id: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub state: GroupState,

    /// Partition assignment strategy (e.g. "range", "cooperative-sticky").
    #[cfg_attr(feature = "serde", serde(default))]
    pub partition_assignor: Option<String>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub partitions: Vec<PartitionObservation>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub members: Vec<MemberObservation>,

    /// Fairness index as computed by the backend.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub fairness_gini: Option<f64>,

    /// Stuck partition count as computed by the backend.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub stuck_count: Option<u32>,
}

impl GroupSnapshot {
    /// Create an empty snapshot for a group.
    pub fn new(cluster_id: impl Into<String>, group_id: impl Into<String>, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            cluster_id: cluster_id.into(),
            group_id: group_id.into(),
            ..Default::default()
        }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder(cluster_id: impl Into<String>, group_id: impl Into<String>) -> SnapshotBuilder {
        SnapshotBuilder::new(cluster_id, group_id)
    }

    /// Check if the snapshot carries no partitions.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    /// Look up a member by id.
    pub fn member(&self, member_id: &str) -> Option<&MemberObservation> {
        self.members.iter().find(|m| m.member_id == member_id)
    }

    /// Iterate over the partitions of one topic.
    pub fn topic_partitions<'a>(
        &'a self,
        topic: &'a str,
    ) -> impl Iterator<Item = &'a PartitionObservation> + 'a {
        self.partitions.iter().filter(move |p| p.topic == topic)
    }
}

/// Builder for constructing `GroupSnapshot` instances.
#[derive(Debug)]
pub struct SnapshotBuilder {
    snapshot: GroupSnapshot,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new(cluster_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            snapshot: GroupSnapshot::new(cluster_id, group_id, 0),
        }
    }

    /// Set the timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.snapshot.timestamp_ms = ts;
        self
    }

    pub fn state(mut self, state: GroupState) -> Self {
        self.snapshot.state = state;
        self
    }

    pub fn assignor(mut self, assignor: impl Into<String>) -> Self {
        self.snapshot.partition_assignor = Some(assignor.into());
        self
    }

    /// Add a partition built using a closure.
    pub fn partition<F>(mut self, topic: impl Into<String>, partition: u32, f: F) -> Self
    where
        F: FnOnce(PartitionBuilder) -> PartitionBuilder,
    {
        let observation = f(PartitionBuilder::new(topic, partition)).build();
        self.snapshot.partitions.push(observation);
        self
    }

    /// Add a pre-built partition observation.
    pub fn partition_observation(mut self, observation: PartitionObservation) -> Self {
        self.snapshot.partitions.push(observation);
        self
    }

    /// Add a member.
    pub fn member(
        mut self,
        member_id: impl Into<String>,
        client_id: impl Into<String>,
        partition_count: u32,
    ) -> Self {
        self.snapshot
            .members
            .push(MemberObservation::new(member_id, client_id, partition_count));
        self
    }

    /// Attach the backend's own fairness and stuck figures.
    pub fn reported(mut self, fairness_gini: f64, stuck_count: u32) -> Self {
        self.snapshot.fairness_gini = Some(fairness_gini);
        self.snapshot.stuck_count = Some(stuck_count);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> GroupSnapshot {
        self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let snapshot = GroupSnapshot::builder("c1", "g1")
            .timestamp_ms(1703160000000)
            .state(GroupState::PreparingRebalance)
            .assignor("range")
            .partition("events", 0, |p| p.lag(5).member("m1"))
            .partition("events", 1, |p| p.lag(7))
            .partition("audit", 0, |p| p)
            .member("m1", "client-a", 1)
            .build();

        assert_eq!(snapshot.cluster_id, "c1");
        assert_eq!(snapshot.group_id, "g1");
        assert_eq!(snapshot.timestamp_ms, 1703160000000);
        assert_eq!(snapshot.partition_assignor.as_deref(), Some("range"));
        assert_eq!(snapshot.topic_partitions("events").count(), 2);
        assert!(snapshot.member("m1").is_some());
        assert!(snapshot.member("m2").is_none());
        assert!(snapshot.state.is_rebalancing());
    }

    #[test]
    fn rebalancing_states() {
        assert!(GroupState::PreparingRebalance.is_rebalancing());
        assert!(GroupState::CompletingRebalance.is_rebalancing());
        assert!(!GroupState::Stable.is_rebalancing());
        assert!(!GroupState::Empty.is_rebalancing());
        assert!(!GroupState::Dead.is_rebalancing());
        assert!(!GroupState::Unknown.is_rebalancing());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_unknown_state_decodes() {
        let state: GroupState = serde_json::from_str(r#""AssigningLeader""#).unwrap();
        assert_eq!(state, GroupState::Unknown);

        let state: GroupState = serde_json::from_str(r#""CompletingRebalance""#).unwrap();
        assert_eq!(state, GroupState::CompletingRebalance);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_minimal_snapshot_decodes() {
        let json = r#"{"timestamp_ms":10,"cluster_id":"c","group_id":"g"}"#;
        let snapshot: GroupSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.state, GroupState::Unknown);
        assert!(snapshot.is_empty());
        assert!(snapshot.members.is_empty());
        assert_eq!(snapshot.fairness_gini, None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_reported_figures_skipped_when_absent() {
        let snapshot = GroupSnapshot::builder("c", "g").build();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("fairness_gini"));
        assert!(!json.contains("stuck_count"));
    }
}
