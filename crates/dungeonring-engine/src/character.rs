//! A selected class/race pair with derived stats.

use serde::{Deserialize, Serialize};

use crate::rules::{PlayerClass, Race};

/// The playable character bound to a seat once class and race are chosen.
///
/// Attack is class base plus the race attack bonus. Defense is class base
/// plus the race roll bonus when that bonus is positive — a negative roll
/// bonus (Orc) costs dice luck, not armor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub player_class: PlayerClass,
    pub race: Race,
    pub max_hp: i32,
    pub current_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub ability_used_this_match: bool,
    pub ability_used_this_turn: bool,
    pub rerolls_used_this_turn: u32,
}

impl Character {
    pub fn new(player_class: PlayerClass, race: Race) -> Self {
        let stats = player_class.stats();
        let bonuses = race.bonuses();
        Self {
            player_class,
            race,
            max_hp: stats.base_hp,
            current_hp: stats.base_hp,
            attack: stats.base_attack + bonuses.attack_bonus,
            defense: stats.base_defense + bonuses.roll_bonus.max(0),
            ability_used_this_match: false,
            ability_used_this_turn: false,
            rerolls_used_this_turn: 0,
        }
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.current_hp = (self.current_hp - damage).max(0);
    }

    pub fn heal(&mut self, amount: i32) {
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }

    /// Clears the per-turn counters when this character's turn begins.
    pub fn reset_for_new_turn(&mut self) {
        self.ability_used_this_turn = false;
        self.rerolls_used_this_turn = 0;
    }

    /// Restores hp and clears every usage flag at match start.
    pub fn reset_for_new_match(&mut self) {
        self.current_hp = self.max_hp;
        self.ability_used_this_match = false;
        self.ability_used_this_turn = false;
        self.rerolls_used_this_turn = 0;
    }

    pub fn can_reroll(&self) -> bool {
        self.race.has_reroll() && self.rerolls_used_this_turn == 0
    }

    pub fn use_reroll(&mut self) {
        if self.can_reroll() {
            self.rerolls_used_this_turn += 1;
        }
    }
}
