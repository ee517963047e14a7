//! Rusty Relay - a line-oriented TCP group chat relay
//!
//! This library provides the core functionality for running a group chat
//! server: a shared session registry keyed by display name, a per-connection
//! handler, and a message router supporting broadcast, targeted (`@name`)
//! and excluding (`-name`) delivery with a banned-word filter.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;

// Re-export main components
pub use config::*;
pub use constants::*;
