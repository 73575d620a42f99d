use std::collections::HashMap;

use crate::session::StreamSession;

pub type ClientId = String;

/// The set of currently-connected sessions, keyed by client id.
///
/// Iteration follows insertion order so join/leave announcements reach
/// clients in a stable order. The registry is only ever touched under the
/// hub's lock; it does no synchronization of its own.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    sessions: HashMap<ClientId, StreamSession>,
    order: Vec<ClientId>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Adds a session. Returns `false` without replacing anything if the
    /// client id is already registered.
    pub fn add(&mut self, session: StreamSession) -> bool {
        let client_id = session.client_id().to_string();
        if self.sessions.contains_key(&client_id) {
            return false;
        }
        self.order.push(client_id.clone());
        self.sessions.insert(client_id, session);
        true
    }

    /// Removes and returns the session. Absent ids are a no-op.
    pub fn remove(&mut self, client_id: &str) -> Option<StreamSession> {
        let removed = self.sessions.remove(client_id);
        if removed.is_some() {
            self.order.retain(|id| id != client_id);
        }
        removed
    }

    pub fn get(&self, client_id: &str) -> Option<&StreamSession> {
        self.sessions.get(client_id)
    }

    pub fn get_mut(&mut self, client_id: &str) -> Option<&mut StreamSession> {
        self.sessions.get_mut(client_id)
    }

    pub fn contains(&self, client_id: &str) -> bool {
        self.sessions.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Point-in-time copy of the registered ids in insertion order.
    ///
    /// Broadcast iterates over this copy, so sessions removed mid-delivery
    /// (a failed enqueue) never corrupt or skip the remaining deliveries.
    pub fn snapshot(&self) -> Vec<ClientId> {
        self.order.clone()
    }
}
