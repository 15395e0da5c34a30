use crate::core::connection::Connection;

/// One connected, identified user
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    /// Display label, carried in events but never used as a key
    pub username: String,
    pub connection: Connection,
    /// Room the user currently occupies, if any
    pub active_room_id: Option<String>,
}

impl Session {
    pub fn new(user_id: String, username: String, connection: Connection) -> Self {
        Self {
            user_id,
            username,
            connection,
            active_room_id: None,
        }
    }

    pub fn active_room(&self) -> Option<&str> {
        self.active_room_id.as_deref()
    }
}
