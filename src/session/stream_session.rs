use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::utils::error::HubError;

/// Lifecycle of one server-to-client stream.
///
/// `Connecting` ends when the `init` event is enqueued. There are no
/// transitions out of `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closed,
}

/// One long-lived outbound SSE channel.
///
/// Frames are enqueued into a bounded queue drained by the session's HTTP
/// response body. The queue is never allowed to grow without limit: a full
/// queue means the client cannot keep up and is treated exactly like a
/// closed transport. Either condition marks the session dead; the hub is
/// then expected to remove it.
#[derive(Debug)]
pub struct StreamSession {
    client_id: String,
    user_name: String,
    sender: mpsc::Sender<Bytes>,
    state: SessionState,
}

impl StreamSession {
    /// Creates a session and the receiver half its SSE response will drain.
    pub fn new(client_id: &str, user_name: &str, buffer: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(buffer);
        let session = Self {
            client_id: client_id.to_string(),
            user_name: user_name.to_string(),
            sender,
            state: SessionState::Connecting,
        };
        (session, receiver)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state != SessionState::Closed
    }

    /// Enqueues an encoded frame for delivery.
    ///
    /// Failure is terminal: the session transitions to `Closed` and stays
    /// there. The session never retries a frame.
    pub fn send(&mut self, frame: Bytes) -> Result<(), HubError> {
        if self.state == SessionState::Closed {
            return Err(HubError::Transport(format!(
                "session {} is closed",
                self.client_id
            )));
        }
        match self.sender.try_send(frame) {
            Ok(()) => {
                if self.state == SessionState::Connecting {
                    self.state = SessionState::Active;
                }
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Closed;
                let reason = match err {
                    TrySendError::Full(_) => "outbound queue full",
                    TrySendError::Closed(_) => "transport closed",
                };
                Err(HubError::Transport(format!(
                    "session {}: {reason}",
                    self.client_id
                )))
            }
        }
    }
}
