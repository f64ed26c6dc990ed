//! Snapshot feed abstraction and the resilient connection that drives it.
//!
//! This module provides a trait-based abstraction for reaching a live
//! snapshot feed ([`Connector`]) and reading frames from an open connection
//! ([`Transport`]), plus the [`StreamConnection`] state machine that keeps a
//! subscription alive across transport failures.
//!
//! Two connectors are provided: [`TcpConnector`] for newline-delimited JSON
//! over TCP, and [`ChannelConnector`] for in-process feeds (bridging from
//! another client library, or driving the connection deterministically in
//! tests).

mod backoff;
mod channel;
mod connection;
mod frame;
mod stream;

pub use backoff::BackoffPolicy;
pub use channel::{ChannelConnector, ChannelFeed, FrameSender};
pub use connection::{ConnectionEvent, ConnectionObserver, ConnectionState, StreamConnection};
pub use frame::Frame;
pub use stream::{LineTransport, TcpConnector};

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::json;

use crate::error::TransportError;

/// The logical subscription a connection serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionTarget {
    pub cluster_id: String,
    pub group_id: String,
    /// Backend emission cadence in seconds. Passed through, not enforced.
    pub interval_secs: u32,
}

impl SubscriptionTarget {
    pub fn new(cluster_id: impl Into<String>, group_id: impl Into<String>, interval_secs: u32) -> Self {
        Self {
            cluster_id: cluster_id.into(),
            group_id: group_id.into(),
            interval_secs,
        }
    }

    /// The subscription request sent when a connection opens.
    pub fn request_line(&self) -> String {
        json!({
            "cluster_id": self.cluster_id,
            "group_id": self.group_id,
            "interval": self.interval_secs,
        })
        .to_string()
    }
}

impl std::fmt::Display for SubscriptionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} every {}s", self.cluster_id, self.group_id, self.interval_secs)
    }
}

/// An open connection to a snapshot feed.
///
/// Dropping the transport closes the underlying connection.
#[async_trait]
pub trait Transport: Send {
    /// Wait for the next raw frame.
    ///
    /// Frames are raw bytes; they are not validated as UTF-8 or JSON here,
    /// so a bad frame is a decode error rather than a transport fault.
    /// Returns `Ok(None)` when the peer closed the stream cleanly.
    async fn next_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError>;
}

/// Opens transports for a subscription.
///
/// # Example
///
/// ```
/// use groupwatch::{ChannelConnector, Connector};
///
/// let (_feed, connector) = ChannelConnector::create("in-process");
/// assert_eq!(connector.description(), "channel: in-process");
/// ```
#[async_trait]
pub trait Connector: Send + Sync + Debug {
    /// Open a connection and send the subscription request.
    async fn connect(&self, target: &SubscriptionTarget) -> Result<Box<dyn Transport>, TransportError>;

    /// Returns a human-readable description of the feed.
    fn description(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_line() {
        let target = SubscriptionTarget::new("prod", "billing", 10);
        let value: serde_json::Value = serde_json::from_str(&target.request_line()).unwrap();
        assert_eq!(value["cluster_id"], "prod");
        assert_eq!(value["group_id"], "billing");
        assert_eq!(value["interval"], 10);
    }

    #[test]
    fn test_display() {
        let target = SubscriptionTarget::new("prod", "billing", 5);
        assert_eq!(target.to_string(), "prod/billing every 5s");
    }
}
