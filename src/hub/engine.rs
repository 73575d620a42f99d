//! Broadcast hub
//!
//! The hub is the single serialization point of the system: every registry
//! mutation, payload construction (uuid and timestamp), and fan-out enqueue
//! happens under one lock, which is what guarantees that any two emissions
//! reach every session in the same order.
//!
//! Enqueues are non-blocking (`try_send` into each session's bounded
//! queue), so no transport I/O ever runs under the lock; the actual socket
//! writes happen in each session's response body, independently per client.

use std::collections::VecDeque;
use std::sync::Mutex;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::hub::payload::{INIT_EVENT, InitPayload, Payload, PayloadKind};
use crate::hub::registry::{ClientId, ClientRegistry};
use crate::session::StreamSession;
use crate::transport::encoder;
use crate::utils::error::HubError;

/// State behind the hub lock.
#[derive(Debug)]
struct HubState {
    registry: ClientRegistry,
    last_emitted: DateTime<Utc>,
}

impl HubState {
    /// Builds a payload whose timestamp is clamped against the previous
    /// emission, keeping hub timestamps monotonically non-decreasing.
    fn next_payload(
        &mut self,
        kind: PayloadKind,
        client_id: &str,
        user_name: &str,
        message: Option<String>,
    ) -> Payload {
        let stamp = Utc::now().max(self.last_emitted);
        self.last_emitted = stamp;
        Payload::new(kind, client_id, user_name, message, stamp)
    }

    /// Fans a payload out to every registered session.
    ///
    /// A failed enqueue never aborts the loop; the failing sessions are
    /// removed afterwards and their departure is announced. Those follow-up
    /// `disconnected` payloads go through the same worklist, so a cascade
    /// of dead transports drains without recursion.
    fn emit(&mut self, first: Payload) {
        let mut pending = VecDeque::from([first]);

        while let Some(payload) = pending.pop_front() {
            let frame = match encoder::encode(payload.kind.event_name(), &payload) {
                Ok(frame) => frame,
                Err(err) => {
                    warn!(error = %err, "dropping unencodable payload");
                    continue;
                }
            };

            let mut dead: Vec<ClientId> = Vec::new();
            for client_id in self.registry.snapshot() {
                let Some(session) = self.registry.get_mut(&client_id) else {
                    continue;
                };
                if let Err(err) = session.send(frame.clone()) {
                    warn!(client = %client_id, error = %err, "delivery failed");
                    dead.push(client_id);
                }
            }

            for client_id in dead {
                if let Some(session) = self.registry.remove(&client_id) {
                    info!(client = %client_id, name = %session.user_name(), "client disconnected");
                    pending.push_back(self.next_payload(
                        PayloadKind::Disconnected,
                        session.client_id(),
                        session.user_name(),
                        None,
                    ));
                }
            }
        }
    }
}

/// Orchestrator for the SSE chat broadcast.
///
/// Owns the [`ClientRegistry`], assigns identity on subscribe, and fans
/// submitted messages and lifecycle events out to every connected session.
/// Cheap to share as `Arc<BroadcastHub>`; every method takes `&self`.
#[derive(Debug)]
pub struct BroadcastHub {
    state: Mutex<HubState>,
    session_buffer: usize,
}

impl BroadcastHub {
    /// Creates an empty hub. `session_buffer` caps each session's outbound
    /// queue; overflowing it counts as a dead transport.
    pub fn new(session_buffer: usize) -> Self {
        Self {
            state: Mutex::new(HubState {
                registry: ClientRegistry::new(),
                last_emitted: DateTime::<Utc>::MIN_UTC,
            }),
            session_buffer,
        }
    }

    /// Registers a new client under a fresh id.
    ///
    /// The new session first receives a private `init` event carrying its
    /// assigned id, then a `connected` payload is broadcast to every
    /// session, the new one included (the UI renders that as its own join
    /// notice). Returns the receiver the transport drains into the SSE
    /// response body.
    pub fn subscribe(
        &self,
        requested_name: &str,
    ) -> Result<(ClientId, mpsc::Receiver<Bytes>), HubError> {
        let user_name = requested_name.trim();
        if user_name.is_empty() {
            return Err(HubError::Validation(
                "display name must not be empty".to_string(),
            ));
        }

        let client_id = Uuid::new_v4().to_string();
        let (mut session, receiver) = StreamSession::new(&client_id, user_name, self.session_buffer);

        let mut state = self.state.lock().unwrap();

        let init = InitPayload {
            client_id: client_id.clone(),
        };
        let frame = encoder::encode(INIT_EVENT, &init)
            .map_err(|err| HubError::Internal(err.to_string()))?;
        session.send(frame)?;

        if !state.registry.add(session) {
            // v4 collisions are not a practical concern; refuse rather than
            // clobber an existing session.
            return Err(HubError::Internal(format!(
                "client id collision: {client_id}"
            )));
        }
        info!(client = %client_id, name = %user_name, "client connected");

        let payload = state.next_payload(PayloadKind::Connected, &client_id, user_name, None);
        state.emit(payload);

        Ok((client_id, receiver))
    }

    /// Broadcasts a chat message from a registered client to every session,
    /// the sender included.
    ///
    /// Returns once the payload has been enqueued everywhere, not once all
    /// transports have written it.
    pub fn submit(&self, client_id: &str, message: &str) -> Result<(), HubError> {
        let text = message.trim();
        if text.is_empty() {
            return Err(HubError::Validation("message must not be empty".to_string()));
        }

        let mut state = self.state.lock().unwrap();
        let Some(session) = state.registry.get(client_id) else {
            return Err(HubError::NotFound(client_id.to_string()));
        };
        let user_name = session.user_name().to_string();

        let payload = state.next_payload(
            PayloadKind::Message,
            client_id,
            &user_name,
            Some(text.to_string()),
        );
        state.emit(payload);
        Ok(())
    }

    /// Removes a session, announcing its departure to the remaining ones.
    ///
    /// Invoked by the transport when a stream ends (client close, network
    /// drop, server shutdown). Idempotent: an already-removed id is a
    /// no-op, so exactly one `disconnected` event is emitted per client.
    pub fn unsubscribe(&self, client_id: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(session) = state.registry.remove(client_id) {
            info!(client = %client_id, name = %session.user_name(), "client disconnected");
            let payload = state.next_payload(
                PayloadKind::Disconnected,
                session.client_id(),
                session.user_name(),
                None,
            );
            state.emit(payload);
        }
    }

    /// Number of currently registered sessions.
    pub fn client_count(&self) -> usize {
        self.state.lock().unwrap().registry.len()
    }

    /// Whether the given client id is currently registered.
    pub fn is_registered(&self, client_id: &str) -> bool {
        self.state.lock().unwrap().registry.contains(client_id)
    }

    /// Drops every session so in-flight SSE responses terminate. Used at
    /// server shutdown.
    pub fn shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        for client_id in state.registry.snapshot() {
            state.registry.remove(&client_id);
        }
        info!("hub shut down");
    }
}
