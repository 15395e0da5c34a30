//! WebSocket connection handles
//! The outbound half of a client connection, as seen by the relay core

use log::warn;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::Message;

/// Handle used to push frames to a single connected client.
///
/// Clones share the same underlying channel and compare equal by `id`.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: String,
    pub sender: mpsc::UnboundedSender<Message>,
    pub connected_at: Instant,
}

impl Connection {
    /// Create a new connection with a unique ID
    pub fn new(sender: mpsc::UnboundedSender<Message>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), sender)
    }

    pub fn with_id(id: String, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Enqueue a text frame for this client.
    ///
    /// Best effort: a closed transport is logged and reported as `false`,
    /// never retried and never raised to the caller.
    pub fn send_text(&self, text: &str) -> bool {
        match self.sender.send(Message::text(text)) {
            Ok(_) => true,
            Err(_) => {
                warn!("Failed to send message to connection {}", self.id);
                false
            }
        }
    }

    /// Ask the transport to close this connection
    pub fn close(&self) -> bool {
        self.sender.send(Message::close()).is_ok()
    }

    /// Whether the transport side has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Calculate the connection duration
    pub fn connection_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_text_reaches_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Connection::new(tx);

        assert!(conn.send_text("hello"));
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.to_str().unwrap(), "hello");
    }

    #[test]
    fn test_send_after_transport_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = Connection::new(tx);
        drop(rx);

        assert!(conn.is_closed());
        assert!(!conn.send_text("hello"));
        assert!(!conn.close());
    }

    #[test]
    fn test_identity_by_id() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let a = Connection::with_id("conn-1".to_string(), tx.clone());
        let b = Connection::with_id("conn-1".to_string(), tx.clone());
        let c = Connection::new(tx);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_close_sends_close_frame() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = Connection::new(tx);

        assert!(conn.close());
        assert!(rx.try_recv().unwrap().is_close());
    }
}
