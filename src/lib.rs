//! Presence Relay - a room-based presence and broadcast relay over WebSocket
//!
//! Clients identify themselves, join a named room and exchange chat and
//! typing events that are fanned out to the other members of that room.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;

// Re-export main components
pub use config::*;
pub use constants::*;
