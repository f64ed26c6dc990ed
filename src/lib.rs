//! # groupwatch
//!
//! A live consumer-group telemetry client and metrics engine.
//!
//! This crate opens a long-lived connection to a snapshot feed, keeps it
//! alive across network interruptions with bounded exponential backoff, and
//! turns each raw per-partition/per-member snapshot into derived health
//! signals: lag distribution, assignment fairness, stuck partitions, topic
//! rollups, rebalance and lag-spike flags.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      LiveMonitorSession                       │
//! │  ┌──────────────────┐   ConnectionEvent   ┌────────────────┐  │
//! │  │ StreamConnection │ ──────────────────▶ │  engine +      │  │
//! │  │ (state machine,  │                     │  data (health, │──┼──▶ subscribers
//! │  │  backoff)        │                     │  history, log) │  │     SessionHandle
//! │  └────────┬─────────┘                     └────────────────┘  │
//! │           │                                                   │
//! │           ▼                                                   │
//! │  ┌──────────────────┐                                         │
//! │  │    Connector     │◀── TcpConnector | ChannelConnector      │
//! │  └──────────────────┘                                         │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`engine`]**: Pure metric computations over a [`GroupSnapshot`]
//! - **[`source`]**: Feed abstraction ([`Connector`], [`Transport`]), frame
//!   decoding and the reconnecting [`StreamConnection`]
//! - **[`data`]**: Health assessment, lag history and the recent-event log
//! - **[`session`]**: The [`LiveMonitorSession`] facade
//! - **[`config`]**: [`Settings`] loading and [`StartOptions`]
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! groupwatch --connect localhost:9090 --cluster prod --group billing
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use groupwatch::{LiveMonitorSession, SessionEvent, Settings, StartOptions, TcpConnector};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load(None)?;
//! let mut session = LiveMonitorSession::new(Arc::new(TcpConnector::new("localhost:9090")), settings);
//!
//! session.subscribe(|event| {
//!     if let SessionEvent::Snapshot(live) = event {
//!         println!("total lag {}", live.metrics.total_lag);
//!     }
//! });
//!
//! let handle = session.start(StartOptions::new("prod", "billing"))?;
//! println!("state: {}", handle.state());
//! session.stop().await;
//! # Ok::<_, groupwatch::MonitorError>(())
//! # });
//! ```
//!
//! ### Computing metrics directly
//!
//! ```
//! use groupwatch::engine::{compute, MetricsConfig};
//! use groupwatch::GroupSnapshot;
//!
//! let snapshot = GroupSnapshot::builder("prod", "billing")
//!     .partition("orders", 0, |p| p.lag(100).member("m1"))
//!     .partition("orders", 1, |p| p.lag(300).member("m1"))
//!     .member("m1", "client-1", 2)
//!     .build();
//!
//! let metrics = compute(&snapshot, None, &MetricsConfig::default());
//! assert_eq!(metrics.total_lag, 400);
//! assert_eq!(metrics.fairness_gini, 0.0);
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod session;
pub mod source;

// Re-export main types for convenience
pub use config::{SessionSettings, Settings, StartOptions};
pub use data::{HealthStatus, LagHistory, RecentEventLog};
pub use engine::{Baseline, Discrepancy, MetricsConfig};
pub use error::{DecodeError, MonitorError, TransportError};
pub use groupwatch_types::{
    DataWarning, DerivedMetrics, GroupSnapshot, GroupState, MemberObservation, PartitionObservation, TopicRollup,
};
pub use session::{LiveData, LiveMonitorSession, SessionEvent, SessionHandle, SubscriptionId};
pub use source::{
    BackoffPolicy, ChannelConnector, ChannelFeed, ConnectionEvent, ConnectionObserver, ConnectionState, Connector,
    Frame, FrameSender, LineTransport, StreamConnection, SubscriptionTarget, TcpConnector, Transport,
};
