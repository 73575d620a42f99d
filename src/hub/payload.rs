use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// SSE event name of the private handshake sent only to a new session.
pub const INIT_EVENT: &str = "init";

/// Discriminant of a broadcast payload. Doubles as the SSE event name the
/// browser registers a listener for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Connected,
    Disconnected,
    Message,
}

impl PayloadKind {
    pub fn event_name(self) -> &'static str {
        match self {
            PayloadKind::Connected => "connected",
            PayloadKind::Disconnected => "disconnected",
            PayloadKind::Message => "message",
        }
    }
}

/// A broadcast event as it appears on the wire.
///
/// `uuid` is unique per emitted event (the client uses it as a rendering
/// key), and `timestamp` is stamped by the hub so emissions are
/// monotonically non-decreasing. `message` is only present for
/// `PayloadKind::Message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(rename = "type")]
    pub kind: PayloadKind,
    pub uuid: String,
    pub client_id: String,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Payload {
    /// Builds a payload with a fresh event uuid.
    pub fn new(
        kind: PayloadKind,
        client_id: &str,
        user_name: &str,
        message: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            uuid: Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            user_name: user_name.to_string(),
            message,
            timestamp,
        }
    }
}

/// Body of the `init` event. Carries the assigned identity and nothing
/// else; it is never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    pub client_id: String,
}
