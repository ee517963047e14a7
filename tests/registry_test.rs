use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tokio::sync::Notify;

use rusty_relay::core::registry::{
    create_registry, lock_registry, RegisterOutcome, Session, SessionRegistry,
};

fn make_session(name: &str) -> (Session, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Session::new(name.to_string(), tx, Arc::new(Notify::new())),
        rx,
    )
}

#[test]
fn test_register_distinct_names() {
    let mut registry = SessionRegistry::new();
    let (alice, _rx_a) = make_session("alice");
    let (bob, _rx_b) = make_session("bob");

    assert_eq!(registry.register(alice), RegisterOutcome::Accepted);
    assert_eq!(registry.register(bob), RegisterOutcome::Accepted);
    assert_eq!(registry.client_count(), 2);
    assert_eq!(registry.snapshot_names(), vec!["alice", "bob"]);
}

#[test]
fn test_conflict_leaves_registry_untouched() {
    let mut registry = SessionRegistry::new();
    let (first, mut rx_first) = make_session("alice");
    let (second, _rx_second) = make_session("alice");

    assert_eq!(registry.register(first), RegisterOutcome::Accepted);
    assert_eq!(registry.register(second), RegisterOutcome::Conflict);
    assert_eq!(registry.client_count(), 1);

    // The surviving entry is still the first session's handle
    registry
        .get("alice")
        .expect("alice should still be registered")
        .send_line("ping");
    assert_eq!(rx_first.try_recv().unwrap(), "ping");
}

#[test]
fn test_concurrent_registration_has_one_winner() {
    let registry = create_registry();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                let (session, _rx) = make_session("dup");
                let outcome = lock_registry(&registry).unwrap().register(session);
                outcome == RegisterOutcome::Accepted
            })
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|accepted| *accepted)
        .count();

    assert_eq!(accepted, 1, "exactly one registration may succeed");
    assert_eq!(lock_registry(&registry).unwrap().client_count(), 1);
}

#[test]
fn test_unregister_is_idempotent() {
    let mut registry = SessionRegistry::new();
    let (session, _rx) = make_session("bob");
    registry.register(session);

    registry.unregister("bob");
    registry.unregister("bob");
    registry.unregister("absent");
    assert_eq!(registry.client_count(), 0);
}

#[test]
fn test_shutdown_all_drains_registry() {
    let mut registry = SessionRegistry::new();
    for name in ["alice", "bob", "carol"] {
        let (session, _rx) = make_session(name);
        registry.register(session);
    }

    let drained = registry.shutdown_all();
    assert_eq!(drained.len(), 3);
    assert_eq!(registry.client_count(), 0);
    assert!(registry.snapshot_names().is_empty());
}

#[test]
fn test_for_each_visits_every_session() {
    let mut registry = SessionRegistry::new();
    for name in ["alice", "bob"] {
        let (session, _rx) = make_session(name);
        registry.register(session);
    }

    let mut visited = Vec::new();
    registry.for_each(|session| visited.push(session.name.clone()));
    visited.sort();
    assert_eq!(visited, vec!["alice", "bob"]);
}
