//! Settings and start options.
//!
//! [`Settings`] holds the tunables that rarely change between runs and is
//! loaded from an optional TOML file plus `GROUPWATCH_*` environment
//! overrides. [`StartOptions`] names the group to watch and is supplied per
//! session.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::{DEFAULT_EVENT_LOG_CAPACITY, DEFAULT_HISTORY_SIZE};
use crate::engine::MetricsConfig;
use crate::error::MonitorError;
use crate::source::{BackoffPolicy, SubscriptionTarget};

const ENV_PREFIX: &str = "GROUPWATCH";

/// Session-side bookkeeping limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub event_log_capacity: usize,
    pub history_size: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

/// All tunables.
///
/// ```toml
/// [connection]
/// base_delay_ms = 1000
/// cap_delay_ms = 30000
/// max_attempts = 5
///
/// [metrics]
/// lag_spike_multiplier = 3.0
/// lag_spike_floor = 10000
///
/// [session]
/// event_log_capacity = 5
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub connection: BackoffPolicy,
    pub metrics: MetricsConfig,
    pub session: SessionSettings,
}

impl Settings {
    /// Load settings from an optional file, then apply environment overrides.
    ///
    /// Environment variables use the `GROUPWATCH_` prefix and `__` between
    /// section and key, e.g. `GROUPWATCH_CONNECTION__MAX_ATTEMPTS=8`.
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, MonitorError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| MonitorError::Config(e.to_string()))
    }
}

/// What to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartOptions {
    pub cluster_id: String,
    pub group_id: String,
    /// Backend emission cadence, passed through to the server.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u32,
    #[serde(default = "default_auto_reconnect")]
    pub auto_reconnect: bool,
}

fn default_poll_interval() -> u32 {
    10
}

fn default_auto_reconnect() -> bool {
    true
}

impl StartOptions {
    pub fn new(cluster_id: impl Into<String>, group_id: impl Into<String>) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            group_id: group_id.into(),
            poll_interval_seconds: default_poll_interval(),
            auto_reconnect: default_auto_reconnect(),
        }
    }

    pub fn poll_interval(mut self, seconds: u32) -> Self {
        self.poll_interval_seconds = seconds;
        self
    }

    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    /// Reject missing identifiers before any connection is attempted.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.cluster_id.trim().is_empty() {
            return Err(MonitorError::Config("cluster_id is required".to_string()));
        }
        if self.group_id.trim().is_empty() {
            return Err(MonitorError::Config("group_id is required".to_string()));
        }
        Ok(())
    }

    pub fn target(&self) -> SubscriptionTarget {
        SubscriptionTarget::new(&self.cluster_id, &self.group_id, self.poll_interval_seconds)
    }
}
