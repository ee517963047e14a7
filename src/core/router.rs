//! Message classification and delivery
//! Every delivery path snapshots and writes recipient channels under the
//! registry mutex; the actual socket I/O happens in each connection's writer
//! task, so one slow recipient cannot stall a broadcast or block new
//! registrations.

use std::sync::Arc;

use log::{debug, warn};

use crate::constants::{
    BANNED_WORD_WARNING, BAN_LIST_COMMAND, EXIT_COMMAND, ROSTER_HEADER, USAGE_LINES, WELCOME_LINE,
};
use crate::core::registry::{lock_registry, RegisterOutcome, Registry, Session};
use crate::error::Result;

/// What the connection handler should do after a line has been routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Continue,
    Disconnect,
}

/// Routes lines from active sessions to their recipients.
#[derive(Clone)]
pub struct MessageRouter {
    registry: Registry,
    banned_words: Arc<Vec<String>>,
}

impl MessageRouter {
    pub fn new(registry: Registry, banned_words: Vec<String>) -> Self {
        Self {
            registry,
            banned_words: Arc::new(banned_words),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a session and announce it. Registration, the roster snapshot
    /// sent to the new client, and the join notice to everyone else happen
    /// under a single lock acquisition, so a concurrent joiner is seen either
    /// in the roster or via a later notice, never both and never neither.
    pub fn register(&self, session: &Session) -> Result<RegisterOutcome> {
        let mut guard = lock_registry(&self.registry)?;
        if guard.register(session.clone()) == RegisterOutcome::Conflict {
            return Ok(RegisterOutcome::Conflict);
        }

        session.send_line(WELCOME_LINE);
        for line in USAGE_LINES {
            session.send_line(line);
        }
        session.send_line(ROSTER_HEADER);
        for name in guard.snapshot_names() {
            session.send_line(&format!("- {}", name));
        }

        let notice = format!("SERVER: {} has entered the chat!", session.name);
        guard.for_each(|other| {
            if other.name != session.name && !other.send_line(&notice) {
                other.close();
            }
        });
        Ok(RegisterOutcome::Accepted)
    }

    /// Remove a session and notify the remaining ones, under one lock
    /// acquisition so a removed session never sees a later broadcast.
    pub fn unregister_and_announce(&self, name: &str) -> Result<()> {
        let mut guard = lock_registry(&self.registry)?;
        guard.unregister(name);

        let notice = format!("SERVER: {} has left the chat!", name);
        guard.for_each(|other| {
            if !other.send_line(&notice) {
                other.close();
            }
        });
        Ok(())
    }

    /// Classify one trimmed input line from an active session and act on it.
    pub fn route(&self, sender: &str, line: &str) -> Result<Disposition> {
        let line = line.trim();

        if line == EXIT_COMMAND {
            return Ok(Disposition::Disconnect);
        }
        if line == BAN_LIST_COMMAND {
            let reply = format!("Banned words: {}", self.banned_words.join(", "));
            self.send_to(sender, &reply)?;
            return Ok(Disposition::Continue);
        }
        if line.is_empty() {
            return Ok(Disposition::Continue);
        }
        if self.contains_banned_word(line) {
            debug!("Suppressed message from {} containing a banned word", sender);
            self.send_to(sender, BANNED_WORD_WARNING)?;
            return Ok(Disposition::Continue);
        }

        self.deliver(sender, line)?;
        Ok(Disposition::Continue)
    }

    // Raw substring containment, case-sensitive. A banned word triggers even
    // inside an unrelated larger word.
    fn contains_banned_word(&self, line: &str) -> bool {
        self.banned_words.iter().any(|word| line.contains(word))
    }

    // Send a line to one named session only
    fn send_to(&self, name: &str, line: &str) -> Result<()> {
        let guard = lock_registry(&self.registry)?;
        match guard.get(name) {
            Some(session) => {
                if !session.send_line(line) {
                    session.close();
                }
            }
            None => warn!("Dropping personal message for unknown session {}", name),
        }
        Ok(())
    }

    /// Deliver a chat message according to its addressing prefix, always
    /// excluding the sender and always formatted as `sender:line` with the
    /// original text (markers included). Returns the number of recipients
    /// the message was queued for.
    fn deliver(&self, sender: &str, line: &str) -> Result<usize> {
        let targeted = line.starts_with('@');
        let excluding = line.starts_with('-');
        let payload = format!("{}:{}", sender, line);

        let guard = lock_registry(&self.registry)?;
        let mut delivered = 0;
        guard.for_each(|session| {
            if session.name == sender {
                return;
            }
            if targeted && !line.contains(&format!("@{}", session.name)) {
                return;
            }
            if excluding && line.starts_with(&format!("-{}", session.name)) {
                return;
            }
            // A failed queue push never aborts delivery to the rest; the
            // failing session is closed and torn down by its own handler.
            if session.send_line(&payload) {
                delivered += 1;
            } else {
                session.close();
            }
        });
        debug!("Delivered message from {} to {} clients", sender, delivered);
        Ok(delivered)
    }
}
