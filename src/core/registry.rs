//! Session registry: the shared name -> session mapping
//! All mutation and full-registry iteration happens under one mutex, so a
//! registration's absence check, a joiner's roster snapshot, and broadcast
//! iteration are mutually exclusive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::sync::Notify;

use crate::error::Result;
use log::warn;

/// A registered, connected client identified by a unique display name.
///
/// The outbound channel is drained by the connection's dedicated writer task;
/// pushing a line here never blocks on the recipient's socket.
#[derive(Clone)]
pub struct Session {
    pub name: String,
    outbound: mpsc::UnboundedSender<String>,
    closer: Arc<Notify>,
}

impl Session {
    pub fn new(name: String, outbound: mpsc::UnboundedSender<String>, closer: Arc<Notify>) -> Self {
        Self {
            name,
            outbound,
            closer,
        }
    }

    /// Queue one line for delivery to this client. Best-effort: returns false
    /// if the connection's writer task has already terminated.
    pub fn send_line(&self, line: &str) -> bool {
        match self.outbound.send(line.to_string()) {
            Ok(_) => true,
            Err(_) => {
                warn!("Failed to queue message for client {}", self.name);
                false
            }
        }
    }

    /// Wake the owning connection handler out of its blocked read so it runs
    /// its closing path.
    pub fn close(&self) {
        self.closer.notify_one();
    }
}

/// Outcome of a registration attempt. A conflict is a normal protocol event,
/// not an error: the rejected connection is told and closed, nothing else is
/// affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Accepted,
    Conflict,
}

/// Manages all registered sessions and their state
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Check-and-insert. Leaves the registry untouched on conflict; callers
    /// hold the registry mutex, which makes the absence check atomic with the
    /// insert across concurrent registrations.
    pub fn register(&mut self, session: Session) -> RegisterOutcome {
        if self.sessions.contains_key(&session.name) {
            return RegisterOutcome::Conflict;
        }
        self.sessions.insert(session.name.clone(), session);
        RegisterOutcome::Accepted
    }

    /// Remove a session. Idempotent: removing an absent name is a no-op.
    pub fn unregister(&mut self, name: &str) {
        self.sessions.remove(name);
    }

    pub fn get(&self, name: &str) -> Option<&Session> {
        self.sessions.get(name)
    }

    /// All currently registered names, sorted. Taken under the registry mutex
    /// so a joining client sees a consistent roster.
    pub fn snapshot_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Apply `visit` to every registered session; used for broadcast.
    pub fn for_each<F: FnMut(&Session)>(&self, mut visit: F) {
        for session in self.sessions.values() {
            visit(session);
        }
    }

    /// Atomically drain the registry, returning the removed sessions for
    /// external teardown at process shutdown.
    pub fn shutdown_all(&mut self) -> Vec<Session> {
        self.sessions.drain().map(|(_, session)| session).collect()
    }

    /// Get current clients count
    pub fn client_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Thread-safe registry wrapper
pub type Registry = Arc<Mutex<SessionRegistry>>;

// Create a new thread-safe session registry
pub fn create_registry() -> Registry {
    Arc::new(Mutex::new(SessionRegistry::new()))
}

// Acquire the registry mutex, converting a poisoned lock into a crate error
pub fn lock_registry(registry: &Registry) -> Result<MutexGuard<'_, SessionRegistry>> {
    registry.lock().map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str) -> (Session, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(name.to_string(), tx, Arc::new(Notify::new())), rx)
    }

    #[test]
    fn test_register_and_conflict() {
        let mut registry = SessionRegistry::new();
        let (first, _rx1) = session("alice");
        let (second, _rx2) = session("alice");

        assert_eq!(registry.register(first), RegisterOutcome::Accepted);
        assert_eq!(registry.register(second), RegisterOutcome::Conflict);
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = SessionRegistry::new();
        let (s, _rx) = session("bob");
        registry.register(s);

        registry.unregister("bob");
        registry.unregister("bob");
        registry.unregister("never-registered");
        assert_eq!(registry.client_count(), 0);
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let mut registry = SessionRegistry::new();
        for name in ["carol", "alice", "bob"] {
            let (s, _rx) = session(name);
            registry.register(s);
        }
        assert_eq!(registry.snapshot_names(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_send_line_after_receiver_dropped() {
        let (s, rx) = session("gone");
        drop(rx);
        assert!(!s.send_line("hello"));
    }
}
