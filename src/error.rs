//! Error types for the live monitor.
//!
//! Every fault a session can observe is funneled into [`MonitorError`] and
//! delivered through the session's single error channel. Only
//! [`MonitorError::Failed`] is terminal.

use thiserror::Error;

/// Faults raised by a transport while connecting or reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Reading from an open connection failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The peer closed the stream.
    #[error("connection closed by peer")]
    Closed,
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// A frame that could not be decoded. The frame is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Json(String),

    #[error("snapshot frame without data")]
    MissingData,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}

/// Errors surfaced by a [`LiveMonitorSession`](crate::LiveMonitorSession).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// Invalid or missing configuration. Raised before any connection attempt.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Transient transport fault; a reconnect is scheduled unless retries are exhausted.
    #[error("transport fault: {0}")]
    Transport(#[from] TransportError),

    /// A frame was dropped because it could not be decoded.
    #[error("dropped frame: {0}")]
    Decode(#[from] DecodeError),

    /// The server reported an error. The connection stays up.
    #[error("server reported: {0}")]
    Server(String),

    /// Reconnect attempts are exhausted. Reported once per connect cycle.
    #[error("gave up after {attempts} reconnect attempts: {last_error}")]
    Failed {
        attempts: u32,
        last_error: TransportError,
    },
}

impl MonitorError {
    /// True for the terminal fault that ends a connect cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MonitorError::Failed { .. })
    }
}
