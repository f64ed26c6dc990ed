//! Frames received on the live feed.
//!
//! Each frame is a JSON object:
//!
//! ```text
//! {"type": "connected" | "snapshot" | "error" | "heartbeat", "data": GroupSnapshot | null, "message": string | null}
//! ```
//!
//! Any other `type` decodes as [`Frame::Unknown`] so newer servers can add
//! frame kinds without breaking older clients.

use groupwatch_types::GroupSnapshot;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::DecodeError;

/// A decoded frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Server handshake after the subscription is accepted.
    Connected { message: Option<String> },
    /// A new snapshot, optionally annotated by the server.
    Snapshot {
        snapshot: GroupSnapshot,
        annotation: Option<String>,
    },
    /// Server-side error. The stream stays open.
    Error { message: String },
    /// Liveness signal with no data.
    Heartbeat,
    /// A frame type this client does not know.
    Unknown { kind: String },
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl Frame {
    /// Decode a frame from its JSON bytes.
    pub fn decode(bytes: impl AsRef<[u8]>) -> Result<Self, DecodeError> {
        let raw: RawFrame = serde_json::from_slice(bytes.as_ref())?;

        let frame = match raw.kind.as_str() {
            "connected" => Frame::Connected {
                message: raw.message,
            },
            "snapshot" => {
                let data = raw.data.ok_or(DecodeError::MissingData)?;
                Frame::Snapshot {
                    snapshot: serde_json::from_value(data)?,
                    annotation: raw.message,
                }
            }
            "error" => Frame::Error {
                message: raw.message.unwrap_or_else(|| "unspecified server error".to_string()),
            },
            "heartbeat" => Frame::Heartbeat,
            _ => Frame::Unknown { kind: raw.kind },
        };

        Ok(frame)
    }

    /// Encode the frame as a single JSON line (without the newline).
    pub fn encode(&self) -> String {
        let value = match self {
            Frame::Connected { message } => {
                json!({"type": "connected", "data": null, "message": message})
            }
            Frame::Snapshot {
                snapshot,
                annotation,
            } => json!({"type": "snapshot", "data": snapshot, "message": annotation}),
            Frame::Error { message } => json!({"type": "error", "data": null, "message": message}),
            Frame::Heartbeat => json!({"type": "heartbeat", "data": null, "message": null}),
            Frame::Unknown { kind } => json!({"type": kind, "data": null, "message": null}),
        };
        value.to_string()
    }

    /// The wire `type` of this frame.
    pub fn kind(&self) -> &str {
        match self {
            Frame::Connected { .. } => "connected",
            Frame::Snapshot { .. } => "snapshot",
            Frame::Error { .. } => "error",
            Frame::Heartbeat => "heartbeat",
            Frame::Unknown { kind } => kind,
        }
    }
}
