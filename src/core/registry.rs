//! Session and room registry
//!
//! Tracks which user is connected through which connection and which room
//! each user occupies. Session state and room membership are only ever
//! changed together, by `join`, `leave`, `remove` and `drain`, so that a
//! user is a member of at most one room and that room always matches the
//! session's `active_room_id`. Rooms are created on first join and removed
//! as soon as their last member leaves.

use log::debug;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::core::connection::Connection;
use crate::core::room::Room;
use crate::core::session::Session;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// user ID -> session
    sessions: HashMap<String, Session>,
    /// room ID -> room, never holding an empty room
    rooms: HashMap<String, Room>,
    /// connection ID -> user IDs identified on that connection
    handles: HashMap<String, HashSet<String>>,
}

fn unindex_handle(
    handles: &mut HashMap<String, HashSet<String>>,
    connection_id: &str,
    user_id: &str,
) {
    if let Some(users) = handles.get_mut(connection_id) {
        users.remove(user_id);
        if users.is_empty() {
            handles.remove(connection_id);
        }
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `user_id` into `room_id`, leaving any previous room first.
    ///
    /// Creates the session on first sight of the user; otherwise updates it
    /// in place, replacing the connection handle when the user reconnected.
    pub fn join(&mut self, user_id: &str, username: &str, room_id: &str, connection: Connection) {
        self.leave(user_id);

        let connection_id = connection.id.clone();
        match self.sessions.get_mut(user_id) {
            Some(session) => {
                if session.connection.id != connection_id {
                    unindex_handle(&mut self.handles, &session.connection.id, user_id);
                    session.connection = connection;
                }
                session.username = username.to_string();
                session.active_room_id = Some(room_id.to_string());
            }
            None => {
                let mut session =
                    Session::new(user_id.to_string(), username.to_string(), connection);
                session.active_room_id = Some(room_id.to_string());
                self.sessions.insert(user_id.to_string(), session);
            }
        }

        self.handles
            .entry(connection_id)
            .or_default()
            .insert(user_id.to_string());

        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!("Room {} created", room_id);
                Room::new(room_id.to_string())
            })
            .add_member(user_id.to_string());
    }

    /// Take `user_id` out of its current room, keeping the session.
    ///
    /// Returns the room that was left. Unknown users and users without a
    /// room are left untouched.
    pub fn leave(&mut self, user_id: &str) -> Option<String> {
        let session = self.sessions.get_mut(user_id)?;
        let room_id = session.active_room_id.take()?;

        if let Entry::Occupied(mut entry) = self.rooms.entry(room_id.clone()) {
            entry.get_mut().remove_member(user_id);
            if entry.get().is_empty() {
                entry.remove();
                debug!("Room {} dissolved", room_id);
            }
        }

        Some(room_id)
    }

    /// Leave the current room and forget the user entirely
    pub fn remove(&mut self, user_id: &str) -> Option<Session> {
        self.leave(user_id);
        let session = self.sessions.remove(user_id)?;
        unindex_handle(&mut self.handles, &session.connection.id, user_id);
        Some(session)
    }

    /// Find a user identified on the given connection
    pub fn lookup_by_handle(&self, connection: &Connection) -> Option<&str> {
        self.handles
            .get(&connection.id)
            .and_then(|users| users.iter().next())
            .map(String::as_str)
    }

    /// Current members of a room, empty if the room does not exist
    pub fn room_members(&self, room_id: &str) -> HashSet<String> {
        self.rooms
            .get(room_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    pub fn session_for(&self, user_id: &str) -> Option<&Session> {
        self.sessions.get(user_id)
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Forget every session and room, returning each tracked connection once
    pub fn drain(&mut self) -> Vec<Connection> {
        self.rooms.clear();
        self.handles.clear();

        let mut seen = HashSet::new();
        self.sessions
            .drain()
            .map(|(_, session)| session.connection)
            .filter(|connection| seen.insert(connection.id.clone()))
            .collect()
    }
}
