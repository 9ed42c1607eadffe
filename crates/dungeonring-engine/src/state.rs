//! The mutable per-room game session.

use std::time::{SystemTime, UNIX_EPOCH};

use dungeonring_protocol::{PlayerId, RoomId};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::player::Player;
use crate::{BOARD_SIZE, MAX_ROUNDS};

const LOG_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
}

/// One room's simulation. Mutated exclusively by the turn engine and the
/// room lifecycle; the owning actor serializes all access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub room_id: RoomId,
    pub status: GameStatus,
    pub board: Board,
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub current_round: u32,
    pub max_rounds: u32,
    pub start_time: Option<u64>,
    pub end_time: Option<u64>,
    pub winner_id: Option<PlayerId>,
    pub game_log: Vec<String>,
    pub last_event: Option<String>,
    waiting_for_roll: bool,
    waiting_for_reroll: bool,
    pub last_dice_roll: i32,
}

impl GameState {
    pub fn new(room_id: RoomId) -> Self {
        Self {
            room_id,
            status: GameStatus::Waiting,
            board: Board::new(BOARD_SIZE),
            players: Vec::new(),
            current_player_index: 0,
            current_round: 0,
            max_rounds: MAX_ROUNDS,
            start_time: None,
            end_time: None,
            winner_id: None,
            game_log: Vec::new(),
            last_event: None,
            waiting_for_roll: false,
            waiting_for_reroll: false,
            last_dice_roll: 0,
        }
    }

    pub fn current_player(&self) -> Option<&Player> {
        if self.players.is_empty() {
            return None;
        }
        self.players.get(self.current_player_index % self.players.len())
    }

    /// Advances the turn pointer, passing over seats that owe a skipped
    /// turn. Each pass decrements the skipped player's counter once, so
    /// skips always expire. The round counter increments on every wrap
    /// to seat 0, and the incoming player's per-turn counters reset.
    pub fn next_player(&mut self) {
        if self.players.is_empty() {
            return;
        }
        loop {
            self.current_player_index = (self.current_player_index + 1) % self.players.len();
            if self.current_player_index == 0 {
                self.current_round += 1;
            }
            let player = &mut self.players[self.current_player_index];
            if player.skip_turns > 0 {
                player.skip_turns -= 1;
                let line = format!("{} is stunned and skips a turn!", player.username);
                self.add_log(line);
                continue;
            }
            break;
        }
        if let Some(character) = self.players[self.current_player_index].character.as_mut() {
            character.reset_for_new_turn();
        }
    }

    /// The match ends on the round limit or when at most one player is
    /// left standing.
    pub fn is_finished(&self) -> bool {
        self.current_round >= self.max_rounds
            || self.players.iter().filter(|p| p.is_alive()).count() <= 1
    }

    pub fn add_log(&mut self, line: impl Into<String>) {
        self.game_log.push(line.into());
        if self.game_log.len() > LOG_CAPACITY {
            self.game_log.remove(0);
        }
    }

    /// The two waiting flags are mutually exclusive; setting one true
    /// clears the other.
    pub fn set_waiting_for_roll(&mut self, waiting: bool) {
        self.waiting_for_roll = waiting;
        if waiting {
            self.waiting_for_reroll = false;
        }
    }

    pub fn set_waiting_for_reroll(&mut self, waiting: bool) {
        self.waiting_for_reroll = waiting;
        if waiting {
            self.waiting_for_roll = false;
        }
    }

    pub fn waiting_for_roll(&self) -> bool {
        self.waiting_for_roll
    }

    pub fn waiting_for_reroll(&self) -> bool {
        self.waiting_for_reroll
    }

    /// Scores every player and records the winner. Ties resolve to the
    /// first player at the maximum — order-dependent, kept as-is.
    ///
    /// Returns the winner's seat index.
    pub fn calculate_final_scores(&mut self) -> Option<usize> {
        for player in &mut self.players {
            player.calculate_score();
        }
        let mut winner = None;
        let mut best = i32::MIN;
        for (index, player) in self.players.iter().enumerate() {
            if player.score > best {
                best = player.score;
                winner = Some(index);
            }
        }
        if let Some(index) = winner {
            self.winner_id = self.players[index].id;
        }
        winner
    }

    pub(crate) fn player_index(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == Some(player_id))
    }
}

/// Milliseconds since the unix epoch, for start/end timestamps.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
