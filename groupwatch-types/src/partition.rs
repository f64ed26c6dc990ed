//! Per-partition and per-member observations.

/// One partition's consumption state at snapshot time.
///
/// Offsets and lag are optional: the backend may be unable to read them
/// for a moment (leader election, coordinator move). A missing lag counts
/// as zero in every aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionObservation {
    /// Topic the partition belongs to.
    pub topic: String,

    /// Partition number within the topic.
    pub partition: u32,

    /// Messages between the committed offset and the log end.
    #[cfg_attr(feature = "serde", serde(default))]
    pub lag: Option<i64>,

    /// Last offset committed by the group.
    #[cfg_attr(feature = "serde", serde(default))]
    pub committed_offset: Option<i64>,

    /// Log end offset (high watermark).
    #[cfg_attr(feature = "serde", serde(default))]
    pub latest_offset: Option<i64>,

    /// Member currently assigned to this partition, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub assigned_member_id: Option<String>,
}

impl PartitionObservation {
    /// Create an observation with no offsets or assignment.
    pub fn new(topic: impl Into<String>, partition: u32) -> Self {
        Self {
            topic: topic.into(),
            partition,
            ..Default::default()
        }
    }

    /// Lag as it contributes to aggregates.
    ///
    /// Missing lag counts as zero, and so does a negative value (a committed
    /// offset momentarily ahead of a stale high watermark).
    pub fn effective_lag(&self) -> i64 {
        self.lag.unwrap_or(0).max(0)
    }

    /// Create a builder for a partition observation.
    pub fn builder(topic: impl Into<String>, partition: u32) -> PartitionBuilder {
        PartitionBuilder::new(topic, partition)
    }
}

/// One consumer group member at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemberObservation {
    pub member_id: String,

    #[cfg_attr(feature = "serde", serde(default))]
    pub client_id: String,

    /// Number of partitions assigned to this member.
    #[cfg_attr(feature = "serde", serde(default))]
    pub partition_count: u32,
}

impl MemberObservation {
    pub fn new(member_id: impl Into<String>, client_id: impl Into<String>, partition_count: u32) -> Self {
        Self {
            member_id: member_id.into(),
            client_id: client_id.into(),
            partition_count,
        }
    }
}

/// Builder for `PartitionObservation`.
#[derive(Debug)]
pub struct PartitionBuilder {
    observation: PartitionObservation,
}

impl PartitionBuilder {
    /// Create a new builder for the given topic partition.
    pub fn new(topic: impl Into<String>, partition: u32) -> Self {
        Self {
            observation: PartitionObservation::new(topic, partition),
        }
    }

    /// Set the lag.
    pub fn lag(mut self, lag: i64) -> Self {
        self.observation.lag = Some(lag);
        self
    }

    /// Set the committed offset.
    pub fn committed(mut self, offset: i64) -> Self {
        self.observation.committed_offset = Some(offset);
        self
    }

    /// Set the log end offset.
    pub fn latest(mut self, offset: i64) -> Self {
        self.observation.latest_offset = Some(offset);
        self
    }

    /// Set the assigned member.
    pub fn member(mut self, member_id: impl Into<String>) -> Self {
        self.observation.assigned_member_id = Some(member_id.into());
        self
    }

    /// Build the observation.
    pub fn build(self) -> PartitionObservation {
        self.observation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_lag_treats_missing_as_zero() {
        let p = PartitionObservation::new("orders", 3);
        assert_eq!(p.effective_lag(), 0);
    }

    #[test]
    fn effective_lag_clamps_negative() {
        let p = PartitionObservation::builder("orders", 0).lag(-4).build();
        assert_eq!(p.effective_lag(), 0);
    }

    #[test]
    fn builder_sets_all_fields() {
        let p = PartitionObservation::builder("orders", 7)
            .lag(12)
            .committed(88)
            .latest(100)
            .member("m-1")
            .build();

        assert_eq!(p.topic, "orders");
        assert_eq!(p.partition, 7);
        assert_eq!(p.lag, Some(12));
        assert_eq!(p.committed_offset, Some(88));
        assert_eq!(p.latest_offset, Some(100));
        assert_eq!(p.assigned_member_id.as_deref(), Some("m-1"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_null_offsets_decode() {
        let json = r#"{"topic":"t","partition":1,"lag":null,"committed_offset":null,"latest_offset":null,"assigned_member_id":null}"#;
        let p: PartitionObservation = serde_json::from_str(json).unwrap();
        assert_eq!(p.lag, None);
        assert_eq!(p.effective_lag(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_member_defaults() {
        let m: MemberObservation = serde_json::from_str(r#"{"member_id":"m-9"}"#).unwrap();
        assert_eq!(m.client_id, "");
        assert_eq!(m.partition_count, 0);
    }
}
