//! Bounded exponential backoff between reconnect attempts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Reconnect policy.
///
/// The delay before reconnect attempt `n` (1-indexed) is
/// `min(base_delay_ms * 2^(n-1), cap_delay_ms)`. After `max_attempts`
/// consecutive reconnects fail the connection is given up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    pub base_delay_ms: u64,
    pub cap_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: 1_000,
            cap_delay_ms: 30_000,
            max_attempts: 5,
        }
    }
}

impl BackoffPolicy {
    /// Delay before reconnect attempt `attempt` (1-indexed; 0 is treated as 1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let factor = 1u64 << exponent;
        let millis = self.base_delay_ms.saturating_mul(factor).min(self.cap_delay_ms);
        Duration::from_millis(millis)
    }

    /// Whether another reconnect may follow `attempts` failed ones.
    pub fn allows(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = BackoffPolicy::default();
        let delays: Vec<u64> = (1..=7).map(|n| policy.delay_for(n).as_millis() as u64).collect();
        assert_eq!(delays, vec![1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000]);
    }

    #[test]
    fn test_matches_formula() {
        let policy = BackoffPolicy {
            base_delay_ms: 250,
            cap_delay_ms: 10_000,
            max_attempts: 10,
        };
        for n in 1..=20u32 {
            let expected = (250u64 * 2u64.pow(n - 1)).min(10_000);
            assert_eq!(policy.delay_for(n), Duration::from_millis(expected));
        }
    }

    #[test]
    fn test_huge_attempt_does_not_overflow() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
    }

    #[test]
    fn test_allows() {
        let policy = BackoffPolicy::default();
        assert!(policy.allows(0));
        assert!(policy.allows(4));
        assert!(!policy.allows(5));
    }
}
