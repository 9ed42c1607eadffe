//! Error types for the room layer.

use dungeonring_engine::GameError;
use dungeonring_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// The room is full — no more player slots available.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is already in this room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    /// Rooms hold between two and four players.
    #[error("room capacity must be between 2 and 4, got {0}")]
    InvalidCapacity(usize),

    /// The room is in a state that doesn't allow this operation.
    /// For example, trying to join a room that's already in progress.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),

    /// The identity provider rejected the client's token.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A game-rule violation surfaced by the engine.
    #[error(transparent)]
    Game(#[from] GameError),
}
