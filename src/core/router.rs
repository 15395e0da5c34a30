//! Broadcast router that applies inbound events to the registry and fans
//! them out to room members

use log::{debug, info, trace, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::connection::Connection;
use crate::core::message::{Event, EventType};
use crate::core::registry::SessionRegistry;
use crate::error::RelayError;

/// What routing an event did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Joined { room_id: String },
    /// `room_id` is the room that was left, if the user occupied one
    Left { room_id: Option<String> },
    Removed { was_known: bool },
    /// Number of connections the event was enqueued to
    Broadcast { delivered: usize },
}

/// Per-room entry of [`RelayStats`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: String,
    pub members: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Snapshot of the registry for the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RelayStats {
    pub sessions: usize,
    pub rooms: Vec<RoomSummary>,
}

/// Routes decoded events against a single shared registry.
///
/// All registry mutations take the write lock for their whole duration.
/// Broadcasts hold the read lock only while resolving recipients and send
/// after releasing it.
pub struct BroadcastRouter {
    registry: RwLock<SessionRegistry>,
}

impl BroadcastRouter {
    pub fn new() -> Self {
        Self::with_registry(SessionRegistry::new())
    }

    pub fn with_registry(registry: SessionRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Decode a raw text payload and route it.
    ///
    /// Rejected payloads are logged and dropped; nothing is sent back.
    pub async fn handle_raw(&self, raw: &str, connection: &Connection) -> Option<RouteOutcome> {
        match Event::parse(raw) {
            Ok(event) => Some(self.route(event, connection).await),
            Err(RelayError::UnknownEventType(kind)) => {
                warn!(
                    "Unknown event type '{}' received on connection {}",
                    kind, connection.id
                );
                None
            }
            Err(e) => {
                warn!("Rejected event on connection {}: {}", connection.id, e);
                None
            }
        }
    }

    /// Apply one event
    pub async fn route(&self, event: Event, connection: &Connection) -> RouteOutcome {
        match event.kind {
            EventType::Join => {
                let mut registry = self.registry.write().await;
                registry.join(
                    &event.user_id,
                    &event.username,
                    &event.room_id,
                    connection.clone(),
                );
                info!("User {} joined room {}", event.user_id, event.room_id);
                RouteOutcome::Joined {
                    room_id: event.room_id,
                }
            }
            EventType::Leave => {
                let room_id = self.registry.write().await.leave(&event.user_id);
                if let Some(ref room_id) = room_id {
                    info!("User {} left room {}", event.user_id, room_id);
                }
                RouteOutcome::Left { room_id }
            }
            EventType::Disconnect => {
                let was_known = self.registry.write().await.remove(&event.user_id).is_some();
                if was_known {
                    info!("User {} disconnected", event.user_id);
                }
                RouteOutcome::Removed { was_known }
            }
            EventType::Message | EventType::Typing | EventType::StopTyping => {
                let delivered = self.broadcast(&event).await;
                RouteOutcome::Broadcast { delivered }
            }
        }
    }

    /// Fan an event out to the members of its room.
    ///
    /// Typing indicators skip the sender; everything else echoes back to
    /// it. A missing room or member session is expected transient state and
    /// is skipped silently. Returns how many connections accepted the frame.
    pub async fn broadcast(&self, event: &Event) -> usize {
        let mut recipients: Vec<(String, Connection)> = Vec::new();
        {
            let registry = self.registry.read().await;
            let room = match registry.room(&event.room_id) {
                Some(room) => room,
                None => {
                    debug!(
                        "Dropping {} for missing room {}",
                        event.kind, event.room_id
                    );
                    return 0;
                }
            };

            for member_id in &room.members {
                // Skip the sender's own typing indicators
                if event.kind.is_typing_indicator() && *member_id == event.user_id {
                    continue;
                }
                match registry.session_for(member_id) {
                    // Transport already gone; its close notification will clean up
                    Some(session) if session.connection.is_closed() => {
                        trace!("Skipping closed connection for user: {}", member_id);
                    }
                    Some(session) => {
                        recipients.push((member_id.clone(), session.connection.clone()));
                    }
                    None => {}
                }
            }
        }

        let payload = match event.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize {} event: {}", event.kind, e);
                return 0;
            }
        };

        debug!(
            "Broadcasting {} in room {} to {} recipients",
            event.kind,
            event.room_id,
            recipients.len()
        );

        // Sends are non-blocking enqueues, so there is nothing to await here
        let mut delivered = 0;
        for (member_id, connection) in recipients {
            if connection.send_text(&payload) {
                trace!("Event sent to user: {}", member_id);
                delivered += 1;
            }
        }

        delivered
    }

    /// Transport-close cleanup: forget every user identified on `connection`.
    ///
    /// Equivalent to a `disconnect` event for each of them. Returns how many
    /// users were removed.
    pub async fn connection_closed(&self, connection: &Connection) -> usize {
        let mut registry = self.registry.write().await;
        let mut removed = 0;
        loop {
            let user_id = match registry.lookup_by_handle(connection) {
                Some(user_id) => user_id.to_string(),
                None => break,
            };
            if registry.remove(&user_id).is_none() {
                warn!("Handle index pointed at unknown user {}", user_id);
                break;
            }
            info!("User {} disconnected", user_id);
            removed += 1;
        }
        removed
    }

    /// Drop all state and close every tracked connection.
    ///
    /// Returns the number of connections that were asked to close.
    pub async fn shutdown(&self) -> usize {
        let connections = self.registry.write().await.drain();
        let closed = connections
            .iter()
            .filter(|connection| connection.close())
            .count();
        info!(
            "Relay drained: {} of {} connections closed",
            closed,
            connections.len()
        );
        closed
    }

    pub async fn room_members(&self, room_id: &str) -> HashSet<String> {
        self.registry.read().await.room_members(room_id)
    }

    /// The room a user is currently in, `None` for unknown users too
    pub async fn active_room(&self, user_id: &str) -> Option<String> {
        self.registry
            .read()
            .await
            .session_for(user_id)
            .and_then(|session| session.active_room_id.clone())
    }

    pub async fn is_connected(&self, user_id: &str) -> bool {
        self.registry.read().await.session_for(user_id).is_some()
    }

    pub async fn stats(&self) -> RelayStats {
        let registry = self.registry.read().await;
        let mut rooms: Vec<RoomSummary> = registry
            .rooms()
            .map(|room| RoomSummary {
                room_id: room.id.clone(),
                members: room.member_count(),
                created_at: room.created_at,
            })
            .collect();
        rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));

        RelayStats {
            sessions: registry.session_count(),
            rooms,
        }
    }
}

impl Default for BroadcastRouter {
    fn default() -> Self {
        Self::new()
    }
}

// Shared reference to the router
pub type SharedRouter = Arc<BroadcastRouter>;

pub fn create_router() -> SharedRouter {
    Arc::new(BroadcastRouter::new())
}
