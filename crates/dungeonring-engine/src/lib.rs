//! The Dungeonring rules engine.
//!
//! Everything in this crate is synchronous, in-memory game logic: the
//! circular board, the class/race rule tables, combat resolution, the 12
//! event cards, the turn state machine, and the bot decision engine. All
//! randomness flows through the [`Dice`] seam so every rule is
//! deterministic under test.
//!
//! Concurrency lives one layer up — a caller (the room actor) owns a
//! [`GameState`] exclusively and drives it one operation at a time.

pub mod ability;
pub mod board;
pub mod bot;
pub mod combat;
pub mod deck;
pub mod dice;
pub mod error;
pub mod player;
pub mod rules;
pub mod state;
pub mod turn;

mod character;

pub use board::{Board, Tile, TileKind};
pub use character::Character;
pub use combat::CombatResult;
pub use deck::{CardCategory, EventCard};
pub use dice::{Dice, FixedDice};
pub use error::GameError;
pub use player::Player;
pub use rules::{PlayerClass, Race};
pub use state::{GameState, GameStatus};
pub use turn::TurnOutcome;

/// Number of tiles on the board.
pub const BOARD_SIZE: i32 = 24;

/// Rounds played before the match ends on time.
pub const MAX_ROUNDS: u32 = 10;
