//! The live monitor session.
//!
//! [`LiveMonitorSession`] composes a [`StreamConnection`] with the metrics
//! engine. Each snapshot frame is turned into a [`LiveData`] value (raw
//! snapshot, derived metrics, health) that replaces the previous one in a
//! single step, so readers never observe a half-updated state.
//!
//! Presentation code reads state through a [`SessionHandle`] and/or
//! registers callbacks with [`LiveMonitorSession::subscribe`]. Callbacks run
//! synchronously on the connection task in arrival order; a panicking
//! callback is logged and skipped without affecting ingestion or other
//! subscribers.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use groupwatch_types::{DerivedMetrics, GroupSnapshot};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{Settings, StartOptions};
use crate::data::duration::format_duration;
use crate::data::{HealthStatus, LagHistory, RecentEventLog};
use crate::engine::{self, Baseline, Discrepancy, MetricsConfig};
use crate::error::MonitorError;
use crate::source::{ConnectionEvent, ConnectionObserver, ConnectionState, Connector, StreamConnection, SubscriptionTarget};

/// One processed snapshot. Immutable once published.
#[derive(Debug, Clone)]
pub struct LiveData {
    pub snapshot: GroupSnapshot,
    pub metrics: DerivedMetrics,
    pub health: HealthStatus,
    /// Server figures that disagree with `metrics`.
    pub discrepancies: Vec<Discrepancy>,
    /// When the frame was processed locally.
    pub received_at: Instant,
}

/// Delivered to subscribers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Snapshot(Arc<LiveData>),
    State(ConnectionState),
    Heartbeat,
    /// Every fault goes through here. Only [`MonitorError::Failed`] is terminal.
    Error(MonitorError),
}

/// Identifies a registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// State shared between the session, its handles and the ingest observer.
struct Shared {
    live: RwLock<Option<Arc<LiveData>>>,
    events: Mutex<RecentEventLog>,
    history: Mutex<LagHistory>,
    last_error: Mutex<Option<MonitorError>>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber)>>,
    next_id: AtomicU64,
}

impl Shared {
    fn new(settings: &Settings) -> Self {
        Self {
            live: RwLock::new(None),
            events: Mutex::new(RecentEventLog::new(settings.session.event_log_capacity)),
            history: Mutex::new(LagHistory::new(settings.session.history_size)),
            last_error: Mutex::new(None),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn reset(&self, settings: &Settings) {
        *self.live.write() = None;
        *self.events.lock() = RecentEventLog::new(settings.session.event_log_capacity);
        *self.history.lock() = LagHistory::new(settings.session.history_size);
        *self.last_error.lock() = None;
    }

    fn log_event(&self, entry: String) {
        debug!(event = %entry, "recent event");
        self.events.lock().push(entry);
    }

    fn record_error(&self, err: MonitorError) {
        *self.last_error.lock() = Some(err.clone());
        self.notify(&SessionEvent::Error(err));
    }

    fn notify(&self, event: &SessionEvent) {
        // Subscribers may (un)subscribe from inside a callback.
        let subscribers: Vec<(SubscriptionId, Subscriber)> = self.subscribers.lock().clone();

        for (id, callback) in subscribers {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                error!(subscriber = id.0, "subscriber panicked; event skipped for this subscriber");
            }
        }
    }
}

/// Turns connection events into session state.
struct SessionIngest {
    shared: Arc<Shared>,
    config: MetricsConfig,
    target: SubscriptionTarget,
    baseline: Option<Baseline>,
}

impl SessionIngest {
    fn ingest_snapshot(&mut self, snapshot: GroupSnapshot, annotation: Option<String>) {
        let metrics = engine::compute(&snapshot, self.baseline.as_ref(), &self.config);
        let discrepancies = engine::reconcile(&snapshot, &metrics, &self.config);
        let previous = self.shared.live.read().clone();

        debug!(
            group = %snapshot.group_id,
            timestamp_ms = snapshot.timestamp_ms,
            total_lag = metrics.total_lag,
            p95_lag = metrics.p95_lag,
            "snapshot processed"
        );
        for warning in &metrics.warnings {
            warn!(%warning, "data quality");
        }

        if let Some(annotation) = annotation {
            self.shared.log_event(annotation);
        }
        self.annotate_transitions(&snapshot, &metrics, previous.as_deref());
        for discrepancy in &discrepancies {
            warn!(%discrepancy, "server figures disagree");
            self.shared.log_event(discrepancy.to_string());
        }

        self.baseline = Some(Baseline::capture(&snapshot, &metrics));
        self.shared.history.lock().record(&snapshot, &metrics);

        let live = Arc::new(LiveData {
            health: HealthStatus::assess(&metrics),
            snapshot,
            metrics,
            discrepancies,
            received_at: Instant::now(),
        });
        *self.shared.live.write() = Some(live.clone());

        self.shared.notify(&SessionEvent::Snapshot(live));
    }

    fn annotate_transitions(&self, snapshot: &GroupSnapshot, metrics: &DerivedMetrics, previous: Option<&LiveData>) {
        let was_rebalancing = previous.is_some_and(|p| p.metrics.is_rebalancing);
        let had_spike = previous.is_some_and(|p| p.metrics.has_lag_spike);
        let previous_stuck = previous.map_or(0, |p| p.metrics.stuck_count());

        if metrics.is_rebalancing && !was_rebalancing {
            info!(group = %snapshot.group_id, state = %snapshot.state, "rebalance started");
            self.shared.log_event(format!("rebalance started ({})", snapshot.state));
        } else if !metrics.is_rebalancing && was_rebalancing {
            info!(group = %snapshot.group_id, state = %snapshot.state, "rebalance finished");
            self.shared.log_event(format!("rebalance finished ({})", snapshot.state));
        }

        if metrics.has_lag_spike && !had_spike {
            warn!(group = %snapshot.group_id, p95_lag = metrics.p95_lag, "lag spike");
            self.shared.log_event(format!("lag spike: p95 {}", metrics.p95_lag));
        }

        if metrics.stuck_count() != previous_stuck {
            warn!(group = %snapshot.group_id, stuck = metrics.stuck_count(), "stuck partitions changed");
            self.shared
                .log_event(format!("stuck partitions: {} -> {}", previous_stuck, metrics.stuck_count()));
        }
    }
}

impl ConnectionObserver for SessionIngest {
    fn on_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::StateChanged(state) => {
                if state == ConnectionState::Connected {
                    self.shared.log_event(format!("connected to {}", self.target));
                }
                self.shared.notify(&SessionEvent::State(state));
            }
            // Handshakes are logged by the connection, not exposed as data.
            ConnectionEvent::Handshake { .. } => {}
            ConnectionEvent::Snapshot { snapshot, annotation } => {
                self.ingest_snapshot(snapshot, annotation);
            }
            ConnectionEvent::ServerError(message) => {
                self.shared.log_event(format!("server error: {}", message));
                self.shared.record_error(MonitorError::Server(message));
            }
            ConnectionEvent::Heartbeat => self.shared.notify(&SessionEvent::Heartbeat),
            ConnectionEvent::Dropped(err) => self.shared.record_error(err.into()),
            ConnectionEvent::Lost(err) => {
                self.shared.log_event(format!("connection lost: {}", err));
                self.shared.record_error(err.into());
            }
            ConnectionEvent::Reconnecting { attempt, delay } => {
                self.shared
                    .log_event(format!("reconnect attempt {} in {}", attempt, format_duration(delay)));
            }
            ConnectionEvent::Failed { attempts, last_error } => {
                let err = MonitorError::Failed { attempts, last_error };
                error!(error = %err, "monitor failed");
                self.shared.log_event(err.to_string());
                self.shared.record_error(err);
            }
        }
    }
}

/// Read-only view of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
    state: watch::Receiver<ConnectionState>,
    target: SubscriptionTarget,
}

impl SessionHandle {
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state transitions.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn target(&self) -> &SubscriptionTarget {
        &self.target
    }

    /// Latest processed snapshot with its metrics, if any has arrived.
    pub fn latest(&self) -> Option<Arc<LiveData>> {
        self.shared.live.read().clone()
    }

    pub fn snapshot(&self) -> Option<GroupSnapshot> {
        self.latest().map(|live| live.snapshot.clone())
    }

    pub fn metrics(&self) -> Option<DerivedMetrics> {
        self.latest().map(|live| live.metrics.clone())
    }

    /// Recent events, oldest first.
    pub fn recent_events(&self) -> Vec<String> {
        self.shared.events.lock().to_vec()
    }

    /// Recent events, newest first.
    pub fn recent_events_newest_first(&self) -> Vec<String> {
        self.shared.events.lock().newest_first()
    }

    /// Server timestamp of the latest snapshot.
    pub fn last_update_ms(&self) -> Option<u64> {
        self.latest().map(|live| live.snapshot.timestamp_ms)
    }

    /// Total lag growth in messages per second over the retained history.
    pub fn lag_rate(&self) -> Option<f64> {
        self.shared.history.lock().lag_rate()
    }

    pub fn topic_lag_rate(&self, topic: &str) -> Option<f64> {
        self.shared.history.lock().topic_lag_rate(topic)
    }

    /// Normalized total-lag trend (0-7 per point).
    pub fn sparkline(&self) -> Vec<u8> {
        self.shared.history.lock().sparkline()
    }

    pub fn last_error(&self) -> Option<MonitorError> {
        self.shared.last_error.lock().clone()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("target", &self.target)
            .field("state", &self.state())
            .finish()
    }
}

/// Public facade for watching one consumer group.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use groupwatch::{ChannelConnector, Frame, LiveMonitorSession, Settings, StartOptions};
///
/// # tokio_test::block_on(async {
/// let (feed, connector) = ChannelConnector::create("example");
/// let mut session = LiveMonitorSession::new(Arc::new(connector), Settings::default());
///
/// let handle = session.start(StartOptions::new("prod", "billing")).unwrap();
/// let sender = feed.accept();
/// sender.send(&Frame::Heartbeat);
///
/// session.stop().await;
/// assert!(handle.snapshot().is_none());
/// # });
/// ```
pub struct LiveMonitorSession {
    connector: Arc<dyn Connector>,
    settings: Settings,
    shared: Arc<Shared>,
    connection: Option<StreamConnection>,
    handle: Option<SessionHandle>,
}

impl LiveMonitorSession {
    pub fn new(connector: Arc<dyn Connector>, settings: Settings) -> Self {
        let shared = Arc::new(Shared::new(&settings));
        Self {
            connector,
            settings,
            shared,
            connection: None,
            handle: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Register a callback for session events.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        self.shared.subscribers.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.shared.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    /// Start watching. Must be called within a tokio runtime.
    ///
    /// Missing identifiers are rejected before any connection attempt.
    pub fn start(&mut self, options: StartOptions) -> Result<SessionHandle, MonitorError> {
        options.validate()?;
        if self.connection.is_some() {
            return Err(MonitorError::Config("session already started".to_string()));
        }

        self.shared.reset(&self.settings);
        let target = options.target();
        let ingest = SessionIngest {
            shared: self.shared.clone(),
            config: self.settings.metrics.clone(),
            target: target.clone(),
            baseline: None,
        };

        let mut connection = StreamConnection::new(self.connector.clone(), target.clone(), self.settings.connection, ingest)
            .auto_reconnect(options.auto_reconnect);

        let handle = SessionHandle {
            shared: self.shared.clone(),
            state: connection.watch_state(),
            target,
        };

        info!(subscription = %handle.target, feed = self.connector.description(), "starting monitor");
        connection.connect();
        self.connection = Some(connection);
        self.handle = Some(handle.clone());
        Ok(handle)
    }

    /// Handle for the current (or last) run.
    pub fn handle(&self) -> Option<SessionHandle> {
        self.handle.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.as_ref().map_or(ConnectionState::Idle, StreamConnection::state)
    }

    /// Start a fresh connect cycle after `Failed` (or a non-reconnecting
    /// disconnect). Returns false if not started or already running.
    pub fn reconnect(&mut self) -> bool {
        match &mut self.connection {
            Some(connection) => connection.connect(),
            None => false,
        }
    }

    /// Close the transport and cancel any pending reconnect.
    ///
    /// When this returns no further callbacks fire for this run. Safe to call
    /// repeatedly; the session can be started again afterwards.
    pub async fn stop(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.disconnect().await;
            info!(subscription = %connection.target(), "monitor stopped");
        }
    }
}

impl std::fmt::Debug for LiveMonitorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveMonitorSession")
            .field("connector", &self.connector)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{ChannelConnector, ChannelFeed, Frame};
    use groupwatch_types::GroupState;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn session(settings: Settings) -> (ChannelFeed, Arc<ChannelConnector>, LiveMonitorSession) {
        let (feed, connector) = ChannelConnector::create("test");
        let connector = Arc::new(connector);
        let session = LiveMonitorSession::new(connector.clone(), settings);
        (feed, connector, session)
    }

    fn forward(session: &LiveMonitorSession) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        session.subscribe(move |event| {
            let _ = tx.send(event.clone());
        });
        rx
    }

    async fn next_live(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Arc<LiveData> {
        loop {
            if let SessionEvent::Snapshot(live) = rx.recv().await.expect("session events ended") {
                return live;
            }
        }
    }

    fn snapshot(ts: u64, committed: i64) -> GroupSnapshot {
        GroupSnapshot::builder("prod", "billing")
            .timestamp_ms(ts)
            .state(GroupState::Stable)
            .partition("t", 0, |p| p.lag(100).committed(committed).latest(committed + 100).member("m1"))
            .partition("t", 1, |p| p.lag(300).committed(700).latest(1000).member("m1"))
            .member("m1", "client-1", 2)
            .build()
    }

    fn frame(snapshot: GroupSnapshot) -> Frame {
        Frame::Snapshot {
            snapshot,
            annotation: None,
        }
    }

    #[tokio::test]
    async fn test_start_rejects_missing_params() {
        let (_feed, connector, mut session) = session(Settings::default());

        let err = session.start(StartOptions::new("prod", "")).unwrap_err();
        assert!(matches!(err, MonitorError::Config(_)));

        tokio::task::yield_now().await;
        assert_eq!(connector.connect_attempts(), 0);
        assert_eq!(session.state(), ConnectionState::Idle);
        assert!(session.handle().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_rejected() {
        let (_feed, _connector, mut session) = session(Settings::default());

        session.start(StartOptions::new("prod", "billing")).unwrap();
        assert!(matches!(
            session.start(StartOptions::new("prod", "billing")),
            Err(MonitorError::Config(_))
        ));
        session.stop().await;

        assert!(session.start(StartOptions::new("prod", "billing")).is_ok());
        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_updates_handle() {
        let (feed, _connector, mut session) = session(Settings::default());
        let mut rx = forward(&session);
        let handle = session.start(StartOptions::new("prod", "billing")).unwrap();

        let sender = feed.accept();
        sender.send(&frame(snapshot(1_000, 900)));

        let live = next_live(&mut rx).await;
        assert_eq!(live.metrics.total_lag, 400);
        assert_eq!(live.metrics.mean_lag, 200.0);
        assert_eq!(live.metrics.max_lag, 300);
        assert_eq!(live.metrics.fairness_gini, 0.0);
        assert_eq!(live.health, HealthStatus::Healthy);

        assert_eq!(handle.state(), ConnectionState::Connected);
        assert_eq!(handle.last_update_ms(), Some(1_000));
        assert_eq!(handle.metrics().unwrap().topics.len(), 1);
        assert_eq!(handle.recent_events(), vec!["connected to prod/billing every 10s"]);

        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_detection_across_snapshots() {
        let (feed, _connector, mut session) = session(Settings::default());
        let mut rx = forward(&session);
        let handle = session.start(StartOptions::new("prod", "billing")).unwrap();

        let sender = feed.accept();
        sender.send(&frame(snapshot(0, 900)));
        sender.send(&frame(snapshot(10_000, 950)));

        let first = next_live(&mut rx).await;
        assert!(first.metrics.stuck_partitions.is_empty());

        // partition 1 kept committed offset 700 with lag; partition 0 advanced
        let second = next_live(&mut rx).await;
        assert_eq!(second.metrics.stuck_count(), 1);
        assert_eq!(second.metrics.stuck_partitions[0].partition, 1);
        assert_eq!(second.health, HealthStatus::Critical);
        assert!(handle
            .recent_events()
            .contains(&"stuck partitions: 0 -> 1".to_string()));
        assert_eq!(
            handle.recent_events_newest_first().first().map(String::as_str),
            Some("stuck partitions: 0 -> 1")
        );

        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_subscriber_is_isolated() {
        let (feed, _connector, mut session) = session(Settings::default());
        session.subscribe(|event| {
            if matches!(event, SessionEvent::Snapshot(_)) {
                panic!("subscriber bug");
            }
        });
        let mut rx = forward(&session);
        session.start(StartOptions::new("prod", "billing")).unwrap();

        let sender = feed.accept();
        sender.send(&frame(snapshot(1, 900)));
        sender.send(&frame(snapshot(2, 900)));

        assert_eq!(next_live(&mut rx).await.snapshot.timestamp_ms, 1);
        assert_eq!(next_live(&mut rx).await.snapshot.timestamp_ms, 2);
        assert_eq!(session.state(), ConnectionState::Connected);

        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribe() {
        let (_feed, _connector, session) = session(Settings::default());
        let id = session.subscribe(|_| {});

        assert!(session.unsubscribe(id));
        assert!(!session.unsubscribe(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_log_annotations_and_capacity() {
        let mut settings = Settings::default();
        settings.session.event_log_capacity = 3;
        let (feed, _connector, mut session) = session(settings);
        let mut rx = forward(&session);
        let handle = session.start(StartOptions::new("prod", "billing")).unwrap();

        let sender = feed.accept();
        sender.send(&Frame::Snapshot {
            snapshot: snapshot(1, 900),
            annotation: Some("first".into()),
        });
        let rebalancing = GroupSnapshot::builder("prod", "billing")
            .timestamp_ms(2)
            .state(GroupState::PreparingRebalance)
            .build();
        sender.send(&frame(rebalancing));
        sender.send(&frame(snapshot(3, 900)));
        sender.send(&Frame::Error {
            message: "slow backend".into(),
        });

        for _ in 0..3 {
            next_live(&mut rx).await;
        }
        loop {
            if let SessionEvent::Error(err) = rx.recv().await.unwrap() {
                assert_eq!(err, MonitorError::Server("slow backend".into()));
                break;
            }
        }

        assert_eq!(
            handle.recent_events(),
            vec![
                "rebalance started (PreparingRebalance)",
                "rebalance finished (Stable)",
                "server error: slow backend",
            ]
        );
        assert_eq!(handle.state(), ConnectionState::Connected);
        assert_eq!(handle.last_error(), Some(MonitorError::Server("slow backend".into())));

        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_discrepancy_is_logged_not_applied() {
        let (feed, _connector, mut session) = session(Settings::default());
        let mut rx = forward(&session);
        let handle = session.start(StartOptions::new("prod", "billing")).unwrap();

        let reported = GroupSnapshot::builder("prod", "billing")
            .timestamp_ms(1)
            .member("m1", "c1", 1)
            .member("m2", "c2", 1)
            .reported(0.5, 0)
            .build();
        feed.accept().send(&frame(reported));

        let live = next_live(&mut rx).await;
        assert_eq!(live.metrics.fairness_gini, 0.0);
        assert_eq!(live.discrepancies.len(), 1);
        assert!(handle.recent_events().iter().any(|e| e.contains("server fairness 0.500")));

        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_backoff() {
        let (feed, connector, mut session) = session(Settings::default());
        let mut rx = forward(&session);
        let handle = session.start(StartOptions::new("prod", "billing")).unwrap();

        feed.refuse("down");
        loop {
            if let SessionEvent::Error(MonitorError::Transport(_)) = rx.recv().await.unwrap() {
                break;
            }
        }
        // drain the Disconnected/Lost pair, then stop while the timer is pending
        tokio::task::yield_now().await;
        session.stop().await;
        let attempts = connector.connect_attempts();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(connector.connect_attempts(), attempts);
        assert_eq!(handle.state(), ConnectionState::Idle);
        assert!(handle
            .recent_events()
            .contains(&"reconnect attempt 1 in 1s".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_is_reported_once_then_reconnect() {
        let mut settings = Settings::default();
        settings.connection.max_attempts = 2;
        let (feed, connector, mut session) = session(settings);
        let mut rx = forward(&session);
        let handle = session.start(StartOptions::new("prod", "billing")).unwrap();

        for _ in 0..3 {
            feed.refuse("down");
        }

        let mut failures = 0;
        let mut state = handle.watch_state();
        state.wait_for(|s| *s == ConnectionState::Failed).await.unwrap();
        tokio::time::sleep(Duration::from_secs(300)).await;
        while let Ok(event) = rx.try_recv() {
            if let SessionEvent::Error(err) = event {
                if err.is_terminal() {
                    failures += 1;
                }
            }
        }
        assert_eq!(failures, 1);
        assert_eq!(connector.connect_attempts(), 3);
        assert!(handle.last_error().unwrap().is_terminal());

        let _sender = feed.accept();
        assert!(session.reconnect());
        state.wait_for(|s| *s == ConnectionState::Connected).await.unwrap();
        assert_eq!(connector.connect_attempts(), 4);

        session.stop().await;
    }
}
