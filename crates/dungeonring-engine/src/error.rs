//! Error type for game-rule violations.
//!
//! Every variant is a recoverable, caller-facing failure. Detection
//! happens before any mutation, so a returned error always leaves the
//! game state exactly as it was.

use dungeonring_protocol::PlayerId;

/// Errors produced by the turn machine and rule engine.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// No player with this id is seated in the room.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// The action was attempted out of turn, or while the turn machine
    /// is not in a state that allows it.
    #[error("invalid turn: {0}")]
    InvalidTurn(String),

    /// An unknown class or race id was supplied.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The operation conflicts with the current game lifecycle state.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// The ability exists but its usage limit is already consumed.
    #[error("ability unavailable: {0}")]
    AbilityUnavailable(String),

    /// The player has not selected a character yet.
    #[error("character not set")]
    CharacterNotSet,
}
