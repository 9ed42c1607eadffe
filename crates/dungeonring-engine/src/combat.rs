//! Monster encounter resolution.
//!
//! Pure computation: the resolver reads the character and the dice and
//! reports what happened. It never mutates hp or gold — the turn engine
//! applies the damage and hands out rewards.

use crate::character::Character;
use crate::dice::Dice;
use crate::rules::{PlayerClass, Race};

/// Outcome of one monster encounter. Transient, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatResult {
    pub victory: bool,
    pub damage_dealt: i32,
    pub damage_taken: i32,
}

/// Resolves an encounter against a monster of the given level.
///
/// Monster stats scale linearly: hp 15·L, attack 5·L. The player strikes
/// first; if the monster survives it strikes back, and victory then means
/// surviving the hit. The attack-roll die is drawn for every class even
/// though only the Ranger crit consults it, keeping the draw sequence
/// independent of the character.
pub fn resolve<D: Dice + ?Sized>(
    character: &Character,
    monster_level: i32,
    dice: &mut D,
) -> CombatResult {
    if !character.is_alive() {
        return CombatResult {
            victory: false,
            damage_dealt: 0,
            damage_taken: 0,
        };
    }

    let monster_hp = 15 * monster_level;
    let monster_attack = 5 * monster_level;

    let mut damage_dealt = (character.attack + dice.roll_die() / 3 - monster_level / 2).max(1);
    match character.player_class {
        PlayerClass::Warrior => damage_dealt += 1,
        PlayerClass::Paladin if character.ability_used_this_match => damage_dealt += 5,
        _ => {}
    }
    if character.race == Race::Orc {
        damage_dealt += 2;
    }
    let attack_roll = dice.roll_die();
    if character.player_class == PlayerClass::Ranger && attack_roll == 6 {
        damage_dealt *= 2;
    }

    if monster_hp - damage_dealt <= 0 {
        // Slain outright; no retaliation.
        return CombatResult {
            victory: true,
            damage_dealt,
            damage_taken: 0,
        };
    }

    let mut damage_taken = (monster_attack - character.defense / 2).max(1);
    if character.player_class == PlayerClass::Warrior && character.ability_used_this_match {
        damage_taken = 0;
    }

    CombatResult {
        victory: character.current_hp > damage_taken,
        damage_dealt,
        damage_taken,
    }
}
