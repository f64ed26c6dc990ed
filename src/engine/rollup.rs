//! Topic-level lag rollups.

use std::collections::BTreeMap;

use groupwatch_types::{PartitionObservation, TopicRollup};

/// Aggregate partitions by topic.
///
/// Sorted by total lag descending, ties broken by topic name ascending.
pub fn topic_rollups(partitions: &[PartitionObservation]) -> Vec<TopicRollup> {
    // topic -> (partitions, total, max)
    let mut by_topic: BTreeMap<&str, (usize, i64, i64)> = BTreeMap::new();
    for p in partitions {
        let lag = p.effective_lag();
        let entry = by_topic.entry(p.topic.as_str()).or_insert((0, 0, 0));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(lag);
        entry.2 = entry.2.max(lag);
    }

    let mut rollups: Vec<TopicRollup> = by_topic
        .into_iter()
        .map(|(topic, (count, total, max))| TopicRollup {
            topic: topic.to_string(),
            partition_count: count,
            total_lag: total,
            avg_lag: total as f64 / count as f64,
            max_lag: max,
        })
        .collect();

    rollups.sort_by(|a, b| b.total_lag.cmp(&a.total_lag).then_with(|| a.topic.cmp(&b.topic)));
    rollups
}
