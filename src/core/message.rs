//! Relay event types and inbound decoding

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{RelayError, Result};

/// The six event kinds a client may send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Join,
    Leave,
    Disconnect,
    Message,
    Typing,
    StopTyping,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Leave => "leave",
            Self::Disconnect => "disconnect",
            Self::Message => "message",
            Self::Typing => "typing",
            Self::StopTyping => "stop_typing",
        }
    }

    /// Typing indicators are never echoed back to their sender
    pub fn is_typing_indicator(&self) -> bool {
        matches!(self, Self::Typing | Self::StopTyping)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "join" => Ok(Self::Join),
            "leave" => Ok(Self::Leave),
            "disconnect" => Ok(Self::Disconnect),
            "message" => Ok(Self::Message),
            "typing" => Ok(Self::Typing),
            "stop_typing" => Ok(Self::StopTyping),
            other => Err(RelayError::UnknownEventType(other.to_string())),
        }
    }
}

/// Keys held in typed fields of [`Event`]; never stored in its extra map
const TYPED_KEYS: [&str; 4] = ["userId", "username", "type", "roomId"];

/// A validated client event.
///
/// Only the routing fields are typed. Everything else, `text` and
/// `timestamp` included, is kept as raw JSON so the event serializes back
/// to the same object it was decoded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub user_id: String,
    pub username: String,
    #[serde(rename = "type")]
    pub kind: EventType,
    pub room_id: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

// Wire shape before validation: routing fields optional so that missing
// fields surface as validation errors rather than parse errors.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    username: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(rename = "roomId")]
    room_id: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn required(field: &'static str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RelayError::ValidationError(format!(
            "missing required field '{}'",
            field
        ))),
    }
}

impl Event {
    pub fn new(
        kind: EventType,
        user_id: impl Into<String>,
        username: impl Into<String>,
        room_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            kind,
            room_id: room_id.into(),
            extra: Map::new(),
        }
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_field("text", Value::String(text.into()))
    }

    pub fn with_timestamp(self, timestamp: impl Into<Value>) -> Self {
        self.with_field("timestamp", timestamp.into())
    }

    /// Attach an uninterpreted field. Typed keys are ignored.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        let key = key.into();
        if !TYPED_KEYS.contains(&key.as_str()) {
            self.extra.insert(key, value);
        }
        self
    }

    /// Message body, when it is a string
    pub fn text(&self) -> Option<&str> {
        self.extra.get("text").and_then(Value::as_str)
    }

    /// Client timestamp exactly as sent
    pub fn timestamp(&self) -> Option<&Value> {
        self.extra.get("timestamp")
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Decode and validate a raw text payload
    pub fn parse(raw: &str) -> Result<Self> {
        let raw: RawEvent = serde_json::from_str(raw)?;

        let user_id = required("userId", raw.user_id)?;
        let username = required("username", raw.username)?;
        let kind = required("type", raw.kind)?;
        let room_id = required("roomId", raw.room_id)?;
        let kind = kind.parse::<EventType>()?;

        Ok(Self {
            user_id,
            username,
            kind,
            room_id,
            extra: raw.extra,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
