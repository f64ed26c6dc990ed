//! Resilient connection to a snapshot feed.
//!
//! A [`StreamConnection`] keeps at most one transport open for its
//! subscription. A single background task owns every transition:
//!
//! ```text
//! Idle ──connect()──▶ Connecting ──opened──▶ Connected ◀──┐ frame
//!                        ▲   │                  │  └──────┘
//!                        │   └─ error/close ─┐  │ close/error
//!               backoff  │                   ▼  ▼
//!                        └──── attempts < max ─ Disconnected ── attempts >= max ──▶ Failed
//!
//! any state ──disconnect()──▶ Idle
//! ```
//!
//! Every suspension point (opening the transport, waiting for a frame,
//! waiting out a backoff delay) races against the stop signal, and the stop
//! flag is checked before every event is emitted. Tearing the connection
//! down therefore cancels a pending backoff timer outright rather than
//! letting it fire into a dead subscription.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use groupwatch_types::GroupSnapshot;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{BackoffPolicy, Connector, Frame, SubscriptionTarget, Transport};
use crate::error::{DecodeError, TransportError};

/// Lifecycle state of a [`StreamConnection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl ConnectionState {
    /// Returns the display label for this state.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything a connection reports, in the order it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    StateChanged(ConnectionState),
    /// Server handshake frame.
    Handshake { message: Option<String> },
    Snapshot {
        snapshot: GroupSnapshot,
        annotation: Option<String>,
    },
    /// Server-reported error frame. The connection stays up.
    ServerError(String),
    Heartbeat,
    /// A frame that failed to decode and was dropped.
    Dropped(DecodeError),
    /// The transport could not be opened or was lost.
    Lost(TransportError),
    /// A reconnect is scheduled after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
    /// Reconnect attempts are exhausted. Emitted once per connect cycle.
    Failed {
        attempts: u32,
        last_error: TransportError,
    },
}

/// Receives connection events synchronously on the connection task.
pub trait ConnectionObserver: Send + 'static {
    fn on_event(&mut self, event: ConnectionEvent);
}

impl ConnectionObserver for mpsc::UnboundedSender<ConnectionEvent> {
    fn on_event(&mut self, event: ConnectionEvent) {
        let _ = self.send(event);
    }
}

type SharedObserver = Arc<Mutex<Box<dyn ConnectionObserver>>>;

/// One logical subscription to a snapshot feed.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use groupwatch::{BackoffPolicy, ChannelConnector, ConnectionState, StreamConnection, SubscriptionTarget};
/// use tokio::sync::mpsc;
///
/// # tokio_test::block_on(async {
/// let (feed, connector) = ChannelConnector::create("example");
/// let (events, _rx) = mpsc::unbounded_channel();
///
/// let mut connection = StreamConnection::new(
///     Arc::new(connector),
///     SubscriptionTarget::new("prod", "billing", 10),
///     BackoffPolicy::default(),
///     events,
/// );
/// assert_eq!(connection.state(), ConnectionState::Idle);
///
/// connection.connect();
/// connection.disconnect().await;
/// assert_eq!(connection.state(), ConnectionState::Idle);
/// # drop(feed);
/// # });
/// ```
pub struct StreamConnection {
    connector: Arc<dyn Connector>,
    target: SubscriptionTarget,
    policy: BackoffPolicy,
    auto_reconnect: bool,
    state: Arc<watch::Sender<ConnectionState>>,
    observer: SharedObserver,
    run: Option<DriverRun>,
}

struct DriverRun {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl StreamConnection {
    pub fn new(
        connector: Arc<dyn Connector>,
        target: SubscriptionTarget,
        policy: BackoffPolicy,
        observer: impl ConnectionObserver,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            connector,
            target,
            policy,
            auto_reconnect: true,
            state: Arc::new(state),
            observer: Arc::new(Mutex::new(Box::new(observer))),
            run: None,
        }
    }

    /// Enable or disable reconnecting after a lost transport (default: enabled).
    ///
    /// When disabled, a lost transport leaves the connection `Disconnected`.
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn target(&self) -> &SubscriptionTarget {
        &self.target
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Start connecting. Must be called within a tokio runtime.
    ///
    /// Starts a fresh cycle, with the attempt counter at zero, only from
    /// `Idle`, `Failed` or a non-reconnecting `Disconnected`. In any other
    /// state a cycle is already running and this returns `false`. The
    /// decision is made on the published state, so a `Failed` observer
    /// may reconnect even while the finished task is still unwinding.
    pub fn connect(&mut self) -> bool {
        let restartable = match self.state() {
            ConnectionState::Idle | ConnectionState::Failed => true,
            ConnectionState::Disconnected => !self.auto_reconnect,
            ConnectionState::Connecting | ConnectionState::Connected => false,
        };
        if !restartable {
            debug!(subscription = %self.target, state = %self.state(), "connect ignored, already running");
            return false;
        }

        if let Some(run) = self.run.take() {
            let _ = run.stop.send(true);
            run.task.abort();
        }
        self.state.send_replace(ConnectionState::Connecting);

        let (stop_tx, stop_rx) = watch::channel(false);
        let driver = ConnectionDriver {
            connector: self.connector.clone(),
            target: self.target.clone(),
            policy: self.policy,
            auto_reconnect: self.auto_reconnect,
            state: self.state.clone(),
            observer: self.observer.clone(),
            stop: stop_rx,
            attempts: 0,
        };

        let task = tokio::spawn(driver.run());
        self.run = Some(DriverRun {
            stop: stop_tx,
            task,
        });
        true
    }

    /// Tear down the connection and return to `Idle`.
    ///
    /// Closes any open transport and cancels any pending reconnect. No
    /// event from the torn-down cycle is delivered after this returns.
    pub async fn disconnect(&mut self) {
        if let Some(run) = self.run.take() {
            let _ = run.stop.send(true);
            run.task.abort();
            let _ = run.task.await;
        }

        if self.state.send_replace(ConnectionState::Idle) != ConnectionState::Idle {
            self.observer
                .lock()
                .on_event(ConnectionEvent::StateChanged(ConnectionState::Idle));
        }
    }
}

impl fmt::Debug for StreamConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamConnection")
            .field("connector", &self.connector)
            .field("target", &self.target)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for StreamConnection {
    fn drop(&mut self) {
        if let Some(run) = self.run.take() {
            let _ = run.stop.send(true);
            run.task.abort();
        }
    }
}

/// The task that owns one connect cycle.
struct ConnectionDriver {
    connector: Arc<dyn Connector>,
    target: SubscriptionTarget,
    policy: BackoffPolicy,
    auto_reconnect: bool,
    state: Arc<watch::Sender<ConnectionState>>,
    observer: SharedObserver,
    stop: watch::Receiver<bool>,
    attempts: u32,
}

impl ConnectionDriver {
    async fn run(mut self) {
        loop {
            self.transition(ConnectionState::Connecting);

            let connector = self.connector.clone();
            let target = self.target.clone();
            let Some(opened) = until_stopped(&mut self.stop, connector.connect(&target)).await else {
                return;
            };

            let lost = match opened {
                Ok(transport) => {
                    self.attempts = 0;
                    self.transition(ConnectionState::Connected);
                    if !self.stopped() {
                        info!(subscription = %self.target, feed = connector.description(), "connected");
                    }
                    match self.pump(transport).await {
                        Some(reason) => reason,
                        None => return,
                    }
                }
                Err(err) => err,
            };

            if self.stopped() {
                return;
            }
            warn!(subscription = %self.target, error = %lost, "transport lost");
            self.transition(ConnectionState::Disconnected);
            self.emit(ConnectionEvent::Lost(lost.clone()));

            if !self.auto_reconnect {
                return;
            }

            if !self.policy.allows(self.attempts) {
                info!(subscription = %self.target, attempts = self.attempts, "giving up");
                self.transition(ConnectionState::Failed);
                self.emit(ConnectionEvent::Failed {
                    attempts: self.attempts,
                    last_error: lost,
                });
                return;
            }

            self.attempts += 1;
            let delay = self.policy.delay_for(self.attempts);
            debug!(subscription = %self.target, attempt = self.attempts, ?delay, "reconnect scheduled");
            self.emit(ConnectionEvent::Reconnecting {
                attempt: self.attempts,
                delay,
            });

            if until_stopped(&mut self.stop, tokio::time::sleep(delay)).await.is_none() {
                return;
            }
        }
    }

    /// Read frames until the transport ends. `None` means stop was requested.
    async fn pump(&mut self, mut transport: Box<dyn Transport>) -> Option<TransportError> {
        loop {
            match until_stopped(&mut self.stop, transport.next_frame()).await? {
                Ok(Some(bytes)) => self.dispatch(&bytes),
                Ok(None) => return Some(TransportError::Closed),
                Err(err) => return Some(err),
            }
        }
    }

    fn dispatch(&mut self, bytes: &[u8]) {
        match Frame::decode(bytes) {
            Ok(Frame::Connected { message }) => {
                debug!(subscription = %self.target, ?message, "handshake");
                self.emit(ConnectionEvent::Handshake { message });
            }
            Ok(Frame::Snapshot {
                snapshot,
                annotation,
            }) => {
                self.emit(ConnectionEvent::Snapshot {
                    snapshot,
                    annotation,
                });
            }
            Ok(Frame::Error { message }) => {
                warn!(subscription = %self.target, %message, "server reported error");
                self.emit(ConnectionEvent::ServerError(message));
            }
            Ok(Frame::Heartbeat) => {
                trace!(subscription = %self.target, "heartbeat");
                self.emit(ConnectionEvent::Heartbeat);
            }
            Ok(Frame::Unknown { kind }) => {
                debug!(subscription = %self.target, %kind, "ignoring unknown frame type");
            }
            Err(err) => {
                warn!(subscription = %self.target, error = %err, "dropping malformed frame");
                self.emit(ConnectionEvent::Dropped(err));
            }
        }
    }

    fn stopped(&self) -> bool {
        *self.stop.borrow()
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.stopped() {
            return;
        }
        self.state.send_replace(next);
        self.emit(ConnectionEvent::StateChanged(next));
    }

    fn emit(&self, event: ConnectionEvent) {
        if self.stopped() {
            return;
        }
        self.observer.lock().on_event(event);
    }
}

/// Await `fut` unless stop is signalled (or the stop sender is dropped) first.
async fn until_stopped<F: Future>(stop: &mut watch::Receiver<bool>, fut: F) -> Option<F::Output> {
    if *stop.borrow() {
        return None;
    }
    tokio::select! {
        biased;
        _ = stop.changed() => None,
        out = fut => Some(out),
    }
}
