use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// A named broadcast group
#[derive(Debug, Clone)]
pub struct Room {
    /// Client-chosen room identifier
    pub id: String,
    /// User IDs currently in the room
    pub members: HashSet<String>,
    /// Timestamp of room creation
    pub created_at: DateTime<Utc>,
}

impl Room {
    /// Creates an empty room with the given ID
    pub fn new(id: String) -> Self {
        Self {
            id,
            members: HashSet::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a member, returns false if it was already present
    pub fn add_member(&mut self, user_id: String) -> bool {
        self.members.insert(user_id)
    }

    pub fn remove_member(&mut self, user_id: &str) -> bool {
        self.members.remove(user_id)
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.contains(user_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
