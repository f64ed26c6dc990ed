//! Session-side data tracking built on top of derived metrics.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "500ms")
//! - [`event_log`]: The bounded [`RecentEventLog`] of human-readable transitions
//! - [`health`]: [`HealthStatus`] assessment from [`DerivedMetrics`](groupwatch_types::DerivedMetrics)
//! - [`history`]: Lag history for sparklines and growth rates
//!
//! ## Data Flow
//!
//! ```text
//! GroupSnapshot + DerivedMetrics
//!        │
//!        ├──▶ HealthStatus::assess()
//!        │
//!        ├──▶ LagHistory::record() (for sparklines and rates)
//!        │
//!        └──▶ RecentEventLog::push() (annotations, transitions)
//! ```

pub mod duration;
pub mod event_log;
pub mod health;
pub mod history;

pub use event_log::{RecentEventLog, DEFAULT_EVENT_LOG_CAPACITY};
pub use health::HealthStatus;
pub use history::{LagHistory, DEFAULT_HISTORY_SIZE};
