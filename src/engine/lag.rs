//! Lag distribution statistics.

use groupwatch_types::PartitionObservation;

/// Summary statistics over per-partition lag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LagStats {
    pub count: usize,
    pub total: i64,
    pub mean: f64,
    pub p50: i64,
    pub p95: i64,
    pub max: i64,
}

/// Nearest-rank index for a percentile over `n` sorted values.
///
/// `ceil(percentile * n / 100) - 1`, clamped to `[0, n - 1]`. Returns 0
/// when `n` is 0 (callers guard the empty case) or the percentile is NaN.
/// Percentiles outside `[0, 100]` are clamped.
pub fn nearest_rank_index(percentile: f64, n: usize) -> usize {
    if n == 0 || percentile.is_nan() {
        return 0;
    }
    let rank = (percentile.clamp(0.0, 100.0) * n as f64 / 100.0).ceil();
    if rank <= 1.0 {
        return 0;
    }
    (rank as usize - 1).min(n - 1)
}

/// Nearest-rank percentile of an ascending slice. Zero when empty.
pub fn percentile(sorted: &[i64], p: f64) -> i64 {
    if sorted.is_empty() {
        return 0;
    }
    sorted[nearest_rank_index(p, sorted.len())]
}

/// Compute lag statistics. Missing lag counts as zero.
pub fn lag_stats(partitions: &[PartitionObservation]) -> LagStats {
    if partitions.is_empty() {
        return LagStats::default();
    }

    let mut lags: Vec<i64> = partitions.iter().map(|p| p.effective_lag()).collect();
    lags.sort_unstable();

    let total = lags.iter().fold(0i64, |acc, &l| acc.saturating_add(l));
    let count = lags.len();

    LagStats {
        count,
        total,
        mean: total as f64 / count as f64,
        p50: percentile(&lags, 50.0),
        p95: percentile(&lags, 95.0),
        max: lags[count - 1],
    }
}
