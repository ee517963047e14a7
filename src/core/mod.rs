//! Core functionality for the chat relay server

pub mod connection;
pub mod registry;
pub mod router;
pub mod server;

// Re-export main components for convenience
pub use connection::{handle_client, DisconnectReason};
pub use registry::{create_registry, lock_registry, RegisterOutcome, Registry, Session, SessionRegistry};
pub use router::{Disposition, MessageRouter};
pub use server::RelayServer;
