//! Static rule tables: the 8 classes and 8 races.
//!
//! Variants are plain tags; all numbers live in const dispatch tables so
//! the whole rule set is centralized and exhaustively checked. Wire ids
//! (used by character selection) are stable and independent of variant
//! order.

use serde::{Deserialize, Serialize};

/// Base stats for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassStats {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub base_hp: i32,
    pub base_attack: i32,
    pub base_defense: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerClass {
    Warrior,
    Mage,
    Rogue,
    Cleric,
    Ranger,
    Paladin,
    Bard,
    Necromancer,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 8] = [
        PlayerClass::Warrior,
        PlayerClass::Mage,
        PlayerClass::Rogue,
        PlayerClass::Cleric,
        PlayerClass::Ranger,
        PlayerClass::Paladin,
        PlayerClass::Bard,
        PlayerClass::Necromancer,
    ];

    pub const fn stats(self) -> ClassStats {
        match self {
            PlayerClass::Warrior => ClassStats {
                id: 1,
                name: "Warrior",
                description: "Deal +1 damage, shield once per match",
                base_hp: 100,
                base_attack: 15,
                base_defense: 10,
            },
            PlayerClass::Mage => ClassStats {
                id: 2,
                name: "Mage",
                description: "Cast fireball (3 tiles range), higher mana",
                base_hp: 80,
                base_attack: 20,
                base_defense: 8,
            },
            PlayerClass::Rogue => ClassStats {
                id: 3,
                name: "Rogue",
                description: "Steal gold from player on same tile, dodge chance",
                base_hp: 70,
                base_attack: 18,
                base_defense: 12,
            },
            PlayerClass::Cleric => ClassStats {
                id: 4,
                name: "Cleric",
                description: "Heal self, remove curses",
                base_hp: 90,
                base_attack: 15,
                base_defense: 10,
            },
            PlayerClass::Ranger => ClassStats {
                id: 5,
                name: "Ranger",
                description: "Critical hit on 6 roll, move through enemies",
                base_hp: 85,
                base_attack: 17,
                base_defense: 11,
            },
            PlayerClass::Paladin => ClassStats {
                id: 6,
                name: "Paladin",
                description: "Smite evil monsters, protect ally once per match",
                base_hp: 95,
                base_attack: 14,
                base_defense: 12,
            },
            PlayerClass::Bard => ClassStats {
                id: 7,
                name: "Bard",
                description: "Buff all players (chaos), distract enemies",
                base_hp: 75,
                base_attack: 16,
                base_defense: 9,
            },
            PlayerClass::Necromancer => ClassStats {
                id: 8,
                name: "Necromancer",
                description: "Summon minion, drain life from monsters",
                base_hp: 70,
                base_attack: 22,
                base_defense: 7,
            },
        }
    }

    pub fn from_id(id: u8) -> Option<PlayerClass> {
        Self::ALL.into_iter().find(|class| class.stats().id == id)
    }

    pub fn name(self) -> &'static str {
        self.stats().name
    }
}

/// Passive bonuses for one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceBonuses {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub movement_bonus: i32,
    pub attack_bonus: i32,
    pub gold_bonus: i32,
    pub roll_bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Orc,
    Halfling,
    Tiefling,
    Dragonborn,
    Goblin,
}

impl Race {
    pub const ALL: [Race; 8] = [
        Race::Human,
        Race::Elf,
        Race::Dwarf,
        Race::Orc,
        Race::Halfling,
        Race::Tiefling,
        Race::Dragonborn,
        Race::Goblin,
    ];

    pub const fn bonuses(self) -> RaceBonuses {
        match self {
            Race::Human => RaceBonuses {
                id: 1,
                name: "Human",
                description: "Balanced, +1 to all rolls",
                movement_bonus: 0,
                attack_bonus: 0,
                gold_bonus: 0,
                roll_bonus: 1,
            },
            Race::Elf => RaceBonuses {
                id: 2,
                name: "Elf",
                description: "+1 movement on 5-6 roll",
                movement_bonus: 1,
                attack_bonus: 0,
                gold_bonus: 0,
                roll_bonus: 0,
            },
            Race::Dwarf => RaceBonuses {
                id: 3,
                name: "Dwarf",
                description: "+2 gold from treasures",
                movement_bonus: 0,
                attack_bonus: 0,
                gold_bonus: 2,
                roll_bonus: 0,
            },
            Race::Orc => RaceBonuses {
                id: 4,
                name: "Orc",
                description: "+2 damage, -1 defense",
                movement_bonus: 0,
                attack_bonus: 2,
                gold_bonus: 0,
                roll_bonus: -1,
            },
            Race::Halfling => RaceBonuses {
                id: 5,
                name: "Halfling",
                description: "Can reroll once per turn",
                movement_bonus: 0,
                attack_bonus: 0,
                gold_bonus: 0,
                roll_bonus: 0,
            },
            Race::Tiefling => RaceBonuses {
                id: 6,
                name: "Tiefling",
                description: "+50% curse effectiveness, chaos magic",
                movement_bonus: 0,
                attack_bonus: 0,
                gold_bonus: 0,
                roll_bonus: 0,
            },
            Race::Dragonborn => RaceBonuses {
                id: 7,
                name: "Dragonborn",
                description: "Breath weapon (3-tile cone), fire resist",
                movement_bonus: 0,
                attack_bonus: 1,
                gold_bonus: 0,
                roll_bonus: 0,
            },
            Race::Goblin => RaceBonuses {
                id: 8,
                name: "Goblin",
                description: "Steal bonus, trap immunity",
                movement_bonus: 0,
                attack_bonus: 0,
                gold_bonus: 1,
                roll_bonus: 0,
            },
        }
    }

    pub fn from_id(id: u8) -> Option<Race> {
        Self::ALL.into_iter().find(|race| race.bonuses().id == id)
    }

    pub fn name(self) -> &'static str {
        self.bonuses().name
    }

    /// Halflings may reroll the dice once per turn.
    pub fn has_reroll(self) -> bool {
        self == Race::Halfling
    }

    /// Goblins ignore trap damage entirely.
    pub fn is_trap_immune(self) -> bool {
        self == Race::Goblin
    }
}
