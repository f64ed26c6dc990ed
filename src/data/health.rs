//! Overall group health from derived metrics.

use groupwatch_types::DerivedMetrics;

/// Health status for a consumer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum HealthStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl HealthStatus {
    /// Assess a group from its latest metrics.
    ///
    /// Stuck partitions are critical; a rebalance or a lag spike is a warning.
    pub fn assess(metrics: &DerivedMetrics) -> Self {
        if !metrics.stuck_partitions.is_empty() {
            HealthStatus::Critical
        } else if metrics.is_rebalancing || metrics.has_lag_spike {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        }
    }

    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "OK",
            HealthStatus::Warning => "WARN",
            HealthStatus::Critical => "CRIT",
        }
    }
}
