//! Channel-based connector.
//!
//! Connections are offered through a [`ChannelFeed`]. Each offer either
//! accepts a connection (yielding a [`FrameSender`] that pushes frames to
//! it) or refuses one with a reason. This is useful for bridging from a
//! message-bus client that already owns the network, and for driving a
//! [`StreamConnection`](super::StreamConnection) deterministically.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use super::{Connector, Frame, SubscriptionTarget, Transport};
use crate::error::TransportError;

type Offer = Result<mpsc::UnboundedReceiver<Vec<u8>>, TransportError>;

/// A connector fed by an in-process [`ChannelFeed`].
///
/// `connect()` waits until the feed offers the next connection. Once the
/// feed is dropped and no offers remain, every `connect()` fails.
///
/// # Example
///
/// ```
/// use groupwatch::{ChannelConnector, Frame};
///
/// let (feed, connector) = ChannelConnector::create("rabbitmq://localhost");
///
/// // Queue one refused attempt, then an accepted connection.
/// feed.refuse("broker restarting");
/// let sender = feed.accept();
/// sender.send(&Frame::Heartbeat);
/// ```
#[derive(Debug)]
pub struct ChannelConnector {
    offers: Mutex<mpsc::UnboundedReceiver<Offer>>,
    description: String,
    attempts: AtomicUsize,
}

/// The producing side of a [`ChannelConnector`].
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    offers: mpsc::UnboundedSender<Offer>,
}

/// Pushes frames into one accepted connection. Dropping it closes the connection.
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelConnector {
    /// Create a connector and the feed that drives it.
    pub fn create(source_description: &str) -> (ChannelFeed, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connector = Self {
            offers: Mutex::new(rx),
            description: format!("channel: {}", source_description),
            attempts: AtomicUsize::new(0),
        };
        (ChannelFeed { offers: tx }, connector)
    }

    /// Number of times `connect()` has been called.
    pub fn connect_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ChannelConnector {
    async fn connect(&self, _target: &SubscriptionTarget) -> Result<Box<dyn Transport>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let mut offers = self.offers.lock().await;
        match offers.recv().await {
            Some(Ok(rx)) => Ok(Box::new(ChannelTransport { rx })),
            Some(Err(err)) => Err(err),
            None => Err(TransportError::Connect("feed closed".to_string())),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl ChannelFeed {
    /// Offer a connection that will be accepted.
    pub fn accept(&self) -> FrameSender {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = self.offers.send(Ok(rx));
        FrameSender { tx }
    }

    /// Offer a connection attempt that will be refused.
    pub fn refuse(&self, reason: impl Into<String>) {
        let _ = self.offers.send(Err(TransportError::Connect(reason.into())));
    }
}

impl FrameSender {
    /// Send a frame. Returns false if the connection is gone.
    pub fn send(&self, frame: &Frame) -> bool {
        self.send_raw(frame.encode())
    }

    /// Send raw frame bytes, well-formed or not.
    pub fn send_raw(&self, bytes: impl Into<Vec<u8>>) -> bool {
        self.tx.send(bytes.into()).is_ok()
    }

    /// Whether the receiving transport has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

struct ChannelTransport {
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn next_frame(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.rx.recv().await)
    }
}
