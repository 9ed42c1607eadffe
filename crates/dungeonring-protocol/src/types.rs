//! Identity newtypes shared by every layer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for a human player.
///
/// Bots have no external identity — seats occupied by bots carry
/// `Option<PlayerId>::None` in the game model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// An opaque 8-character room token.
///
/// Tokens are random alphanumerics generated at room creation and assumed
/// globally unique (collision probability accepted as negligible).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier for a live connection.
///
/// Connections are an ephemeral view onto a room, never the source of
/// truth — a connection subscribes to at most one room at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::new("a1b2c3d4")).unwrap();
        assert_eq!(json, "\"a1b2c3d4\"");
    }

    #[test]
    fn test_room_id_round_trip() {
        let id = RoomId::new("deadbeef");
        let json = serde_json::to_string(&id).unwrap();
        let decoded: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, decoded);
        assert_eq!(decoded.as_str(), "deadbeef");
    }

    #[test]
    fn test_connection_id_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId(1), "alice");
        map.insert(ConnectionId(2), "bob");
        assert_eq!(map[&ConnectionId(1)], "alice");
        assert_eq!(ConnectionId(3).to_string(), "conn-3");
    }
}
