//! Historical lag tracking for sparklines and rate calculations.

use std::collections::{HashMap, VecDeque};

use groupwatch_types::{DerivedMetrics, GroupSnapshot};

/// Default number of historical snapshots to keep.
pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// Tracks lag over time.
///
/// Records one point per snapshot to enable growth-rate calculations and
/// visual trend indicators. Rates use the snapshots' own timestamps, not
/// arrival time, so a burst of buffered snapshots still yields sane rates.
#[derive(Debug, Clone)]
pub struct LagHistory {
    /// Total group lag per snapshot.
    pub totals: VecDeque<i64>,
    /// Per-topic `(timestamp_ms, total_lag)` readings. Topics missing from
    /// the latest snapshot are dropped.
    pub topic_totals: HashMap<String, VecDeque<(u64, i64)>>,
    /// Snapshot timestamps (ms) for rate calculations.
    pub timestamps: VecDeque<u64>,
    capacity: usize,
}

impl Default for LagHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl LagHistory {
    /// Create a new empty history.
    pub fn new(capacity: usize) -> Self {
        Self {
            totals: VecDeque::new(),
            topic_totals: HashMap::new(),
            timestamps: VecDeque::new(),
            capacity: capacity.max(2),
        }
    }

    /// Record a processed snapshot.
    pub fn record(&mut self, snapshot: &GroupSnapshot, metrics: &DerivedMetrics) {
        push_bounded(&mut self.totals, metrics.total_lag, self.capacity);
        push_bounded(&mut self.timestamps, snapshot.timestamp_ms, self.capacity);

        self.topic_totals
            .retain(|topic, _| metrics.topics.iter().any(|r| &r.topic == topic));
        for rollup in &metrics.topics {
            let readings = self.topic_totals.entry(rollup.topic.clone()).or_default();
            push_bounded(readings, (snapshot.timestamp_ms, rollup.total_lag), self.capacity);
        }
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Get sparkline data for total lag (normalized to 0-7 for 8 bar levels).
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self) -> Vec<u8> {
        normalize_sparkline(&self.totals)
    }

    /// Get the lag growth rate (messages per second) for the whole group.
    ///
    /// Positive means the group is falling behind. Returns None if there's
    /// not enough history to calculate a rate.
    pub fn lag_rate(&self) -> Option<f64> {
        let (current, previous) = last_two(&self.totals)?;
        let (current_time, previous_time) = last_two(&self.timestamps)?;
        rate(current - previous, current_time, previous_time)
    }

    /// Lag growth rate for one topic, between its own last two readings.
    ///
    /// None for topics absent from the latest snapshot.
    pub fn topic_lag_rate(&self, topic: &str) -> Option<f64> {
        let ((current_time, current), (previous_time, previous)) = last_two(self.topic_totals.get(topic)?)?;
        rate(current - previous, current_time, previous_time)
    }
}

fn last_two<T: Copy>(values: &VecDeque<T>) -> Option<(T, T)> {
    let len = values.len();
    if len < 2 {
        return None;
    }
    Some((values[len - 1], values[len - 2]))
}

fn rate(delta: i64, current_time: u64, previous_time: u64) -> Option<f64> {
    let elapsed = current_time.saturating_sub(previous_time) as f64 / 1000.0;
    if elapsed > 0.0 {
        Some(delta as f64 / elapsed)
    } else {
        None
    }
}

fn push_bounded<T>(values: &mut VecDeque<T>, value: T, capacity: usize) {
    values.push_back(value);
    while values.len() > capacity {
        values.pop_front();
    }
}

/// Normalize values to 0-7 range for sparkline display.
fn normalize_sparkline(values: &VecDeque<i64>) -> Vec<u8> {
    if values.len() < 2 {
        return Vec::new();
    }

    let max = values.iter().copied().max().unwrap_or(0);
    let min = values.iter().copied().min().unwrap_or(0);
    let range = (max - min).max(1) as f64;

    values
        .iter()
        .map(|&v| {
            let normalized = ((v - min) as f64 / range * 7.0) as u8;
            normalized.min(7)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{compute, MetricsConfig};

    fn record(history: &mut LagHistory, ts: u64, lags: &[i64]) {
        let mut builder = GroupSnapshot::builder("c", "g").timestamp_ms(ts);
        for (i, &lag) in lags.iter().enumerate() {
            builder = builder.partition("t", i as u32, |p| p.lag(lag));
        }
        let snapshot = builder.build();
        let metrics = compute(&snapshot, None, &MetricsConfig::default());
        history.record(&snapshot, &metrics);
    }

    #[test]
    fn test_lag_rate() {
        let mut history = LagHistory::default();
        record(&mut history, 0, &[100]);
        assert_eq!(history.lag_rate(), None);

        record(&mut history, 10_000, &[300]);
        assert_eq!(history.lag_rate(), Some(20.0));
        assert_eq!(history.topic_lag_rate("t"), Some(20.0));
        assert_eq!(history.topic_lag_rate("missing"), None);
    }

    fn record_topics(history: &mut LagHistory, ts: u64, topics: &[(&str, i64)]) {
        let mut builder = GroupSnapshot::builder("c", "g").timestamp_ms(ts);
        for &(topic, lag) in topics {
            builder = builder.partition(topic, 0, |p| p.lag(lag));
        }
        let snapshot = builder.build();
        let metrics = compute(&snapshot, None, &MetricsConfig::default());
        history.record(&snapshot, &metrics);
    }

    #[test]
    fn test_topic_rate_uses_its_own_readings() {
        let mut history = LagHistory::default();
        record_topics(&mut history, 0, &[("a", 100), ("b", 0)]);
        record_topics(&mut history, 100_000, &[("b", 10)]);

        // "a" skipped a snapshot and is gone from the latest one
        assert_eq!(history.topic_lag_rate("a"), None);
        assert!(!history.topic_totals.contains_key("a"));

        record_topics(&mut history, 101_000, &[("a", 200), ("b", 20)]);
        assert_eq!(history.topic_lag_rate("a"), None);
        assert_eq!(history.topic_lag_rate("b"), Some(10.0));

        record_topics(&mut history, 102_000, &[("a", 300), ("b", 20)]);
        assert_eq!(history.topic_lag_rate("a"), Some(100.0));
        assert_eq!(history.topic_lag_rate("b"), Some(0.0));
    }

    #[test]
    fn test_topic_rate_across_a_gap() {
        let mut history = LagHistory::default();
        record_topics(&mut history, 0, &[("a", 100)]);
        record_topics(&mut history, 100_000, &[("a", 100), ("b", 5)]);
        record_topics(&mut history, 101_000, &[("a", 200), ("b", 5)]);

        // paired with the 1s interval it actually spans
        assert_eq!(history.topic_lag_rate("a"), Some(100.0));
        assert_eq!(history.topic_totals["a"].len(), 3);
    }

    #[test]
    fn test_same_timestamp_has_no_rate() {
        let mut history = LagHistory::default();
        record(&mut history, 5, &[1]);
        record(&mut history, 5, &[2]);
        assert_eq!(history.lag_rate(), None);
    }

    #[test]
    fn test_bounded() {
        let mut history = LagHistory::new(3);
        for i in 0..10 {
            record(&mut history, i * 1000, &[i as i64]);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.totals, VecDeque::from(vec![7, 8, 9]));
        assert_eq!(history.topic_totals["t"].len(), 3);
    }

    #[test]
    fn test_sparkline_levels() {
        let mut history = LagHistory::default();
        record(&mut history, 0, &[0]);
        record(&mut history, 1000, &[50]);
        record(&mut history, 2000, &[100]);

        assert_eq!(history.sparkline(), vec![0, 3, 7]);
    }

    #[test]
    fn test_sparkline_needs_two_points() {
        let mut history = LagHistory::default();
        assert!(history.sparkline().is_empty());
        record(&mut history, 0, &[10]);
        assert!(history.sparkline().is_empty());
    }
}
