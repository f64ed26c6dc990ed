//! # groupwatch-types
//!
//! Core types for consumer-group telemetry. This crate defines the data model
//! a snapshot feed delivers (one [`GroupSnapshot`] per emission) and the
//! [`DerivedMetrics`] a client computes from it.
//!
//! ## Design Goals
//!
//! - **Zero required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature for the JSON wire format
//! - **Tolerant decoding**: Missing offsets, unknown group states and absent members
//!   are representable rather than decode failures
//! - **Ergonomic builders**: Fluent API for constructing snapshots in tests and feeds
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde (snake_case field names)
//!
//! ## Example
//!
//! ```rust
//! use groupwatch_types::{GroupSnapshot, GroupState};
//!
//! let snapshot = GroupSnapshot::builder("prod-eu", "billing-consumers")
//!     .timestamp_ms(1_703_160_000_000)
//!     .state(GroupState::Stable)
//!     .partition("invoices", 0, |p| p.lag(120).committed(880).latest(1000).member("m-1"))
//!     .partition("invoices", 1, |p| p.lag(0).committed(400).latest(400).member("m-2"))
//!     .member("m-1", "billing-1", 1)
//!     .member("m-2", "billing-2", 1)
//!     .build();
//!
//! assert_eq!(snapshot.partitions.len(), 2);
//! assert!(!snapshot.state.is_rebalancing());
//! ```

mod metrics;
mod partition;
mod snapshot;

pub use metrics::*;
pub use partition::*;
pub use snapshot::*;
