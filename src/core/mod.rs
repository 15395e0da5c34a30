//! Core functionality for the relay

pub mod connection;
pub mod message;
pub mod registry;
pub mod room;
pub mod router;
pub mod session;

// Re-export main components for convenience
pub use connection::Connection;
pub use message::{Event, EventType};
pub use registry::SessionRegistry;
pub use room::Room;
pub use router::{create_router, BroadcastRouter, RelayStats, RouteOutcome, SharedRouter};
pub use session::Session;
