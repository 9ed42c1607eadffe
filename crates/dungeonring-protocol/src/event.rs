//! Outbound game events — the server → client wire shape.
//!
//! Every event broadcast to a room is one `GameEvent`:
//!
//! ```json
//! { "type": "DICE_ROLLED", "data": 4, "message": "Dice rolled: 4", "gameState": null }
//! ```
//!
//! `gameState` carries a full state snapshot only on `GAME_STATE` events;
//! everything else leaves it null. The state itself is opaque to this
//! layer (a pre-serialized JSON value) so the protocol crate stays free of
//! game-rule types.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::PlayerId;

/// The event type tag on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    GameState,
    PlayerJoined,
    PlayerLeft,
    GameStarted,
    DiceRolled,
    PlayerMoved,
    CombatResult,
    TreasureFound,
    TrapTriggered,
    EventCard,
    GameOver,
    Error,
}

/// A single serialized game event, fanned out to every connection
/// subscribed to a room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: Option<Value>,
    pub message: Option<String>,
    #[serde(rename = "gameState")]
    pub game_state: Option<Value>,
}

impl GameEvent {
    fn new(kind: EventKind, data: Option<Value>, message: Option<String>) -> Self {
        Self {
            kind,
            data,
            message,
            game_state: None,
        }
    }

    /// Full state snapshot. The value is the serialized `GameState`.
    pub fn game_state(state: Value) -> Self {
        Self {
            kind: EventKind::GameState,
            data: None,
            message: None,
            game_state: Some(state),
        }
    }

    pub fn player_joined(username: &str) -> Self {
        Self::new(
            EventKind::PlayerJoined,
            Some(json!(username)),
            Some(format!("{username} joined the game")),
        )
    }

    pub fn player_left(username: &str) -> Self {
        Self::new(
            EventKind::PlayerLeft,
            Some(json!(username)),
            Some(format!("{username} left the game")),
        )
    }

    pub fn game_started() -> Self {
        Self::new(EventKind::GameStarted, None, Some("Game started!".into()))
    }

    pub fn dice_rolled(roll: i32) -> Self {
        Self::new(
            EventKind::DiceRolled,
            Some(json!(roll)),
            Some(format!("Dice rolled: {roll}")),
        )
    }

    pub fn player_moved(username: &str, position: usize) -> Self {
        Self::new(
            EventKind::PlayerMoved,
            Some(json!(position)),
            Some(format!("{username} moved to position {position}")),
        )
    }

    pub fn combat_result(message: impl Into<String>, victory: bool) -> Self {
        Self::new(
            EventKind::CombatResult,
            Some(json!(victory)),
            Some(message.into()),
        )
    }

    pub fn treasure_found(amount: i32) -> Self {
        Self::new(
            EventKind::TreasureFound,
            Some(json!(amount)),
            Some(format!("Found {amount} gold!")),
        )
    }

    pub fn trap_triggered(damage: i32) -> Self {
        Self::new(
            EventKind::TrapTriggered,
            Some(json!(damage)),
            Some(format!("Trap! Took {damage} damage")),
        )
    }

    pub fn event_card(message: impl Into<String>) -> Self {
        Self::new(EventKind::EventCard, None, Some(message.into()))
    }

    pub fn game_over(winner_id: Option<PlayerId>, winner_name: &str) -> Self {
        Self::new(
            EventKind::GameOver,
            Some(json!(winner_id)),
            Some(format!("Game Over! Winner: {winner_name}")),
        )
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventKind::Error, None, Some(message.into()))
    }
}
