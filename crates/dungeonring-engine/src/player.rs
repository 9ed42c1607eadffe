//! A seat in the room: human or bot, with position and loot tallies.

use dungeonring_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::rules::{PlayerClass, Race};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// External identity. Bots carry `None`.
    pub id: Option<PlayerId>,
    pub username: String,
    pub is_bot: bool,
    pub character: Option<Character>,
    pub position: i32,
    pub skip_turns: u32,
    pub gold: i32,
    pub score: i32,
    pub monsters_defeated: u32,
    pub treasures_collected: u32,
}

impl Player {
    pub fn human(id: PlayerId, username: impl Into<String>) -> Self {
        Self::seat(Some(id), username.into(), false)
    }

    pub fn bot(username: impl Into<String>) -> Self {
        Self::seat(None, username.into(), true)
    }

    fn seat(id: Option<PlayerId>, username: String, is_bot: bool) -> Self {
        Self {
            id,
            username,
            is_bot,
            character: None,
            position: 0,
            skip_turns: 0,
            gold: 0,
            score: 0,
            monsters_defeated: 0,
            treasures_collected: 0,
        }
    }

    pub fn select_character(&mut self, player_class: PlayerClass, race: Race) {
        self.character = Some(Character::new(player_class, race));
    }

    /// Any positive gain also counts as a collected treasure, so the
    /// final score observes every source of income.
    pub fn add_gold(&mut self, amount: i32) {
        self.gold += amount;
        if amount > 0 {
            self.treasures_collected += 1;
        }
    }

    /// Floors at zero; a player can never owe gold.
    pub fn remove_gold(&mut self, amount: i32) {
        self.gold = (self.gold - amount).max(0);
    }

    pub fn skip_next_turn(&mut self) {
        self.skip_turns += 1;
    }

    pub fn is_alive(&self) -> bool {
        self.character.as_ref().is_some_and(Character::is_alive)
    }

    /// Score formula: gold, 10 per monster defeated, 5 per treasure.
    pub fn calculate_score(&mut self) {
        self.score =
            self.gold + self.monsters_defeated as i32 * 10 + self.treasures_collected as i32 * 5;
    }
}
