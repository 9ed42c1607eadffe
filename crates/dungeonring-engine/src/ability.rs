//! Class abilities.
//!
//! One active ability per class. The engine hard-gates only the
//! match-scoped abilities (Warrior's shield, Paladin's smite); the
//! per-turn limit is checked by callers through [`can_use_ability`]
//! before invoking, and a successful use marks the turn flag.

use crate::dice::Dice;
use crate::error::GameError;
use crate::rules::PlayerClass;
use crate::state::GameState;

/// Whether this seat may use its ability right now: a character is set
/// and the per-turn limit is unspent.
pub fn can_use_ability(state: &GameState, player_index: usize) -> bool {
    state.players[player_index]
        .character
        .as_ref()
        .is_some_and(|c| !c.ability_used_this_turn)
}

/// Applies the class ability for the seat at `player_index`.
///
/// `dice` is unused by the current ability table but kept in the
/// signature so stochastic abilities slot in without changing callers.
pub fn use_ability<D: Dice + ?Sized>(
    state: &mut GameState,
    player_index: usize,
    _dice: &mut D,
) -> Result<(), GameError> {
    let player = &state.players[player_index];
    let username = player.username.clone();
    let Some(character) = player.character.as_ref() else {
        return Err(GameError::CharacterNotSet);
    };
    let class = character.player_class;

    match class {
        PlayerClass::Warrior => {
            if character.ability_used_this_match {
                return Err(GameError::AbilityUnavailable(
                    "shield already used this match".into(),
                ));
            }
            let character = state.players[player_index]
                .character
                .as_mut()
                .expect("checked above");
            character.ability_used_this_match = true;
            state.add_log(format!("{username} used Warrior's Shield!"));
        }
        PlayerClass::Paladin => {
            if character.ability_used_this_match {
                return Err(GameError::AbilityUnavailable(
                    "smite already used this match".into(),
                ));
            }
            let character = state.players[player_index]
                .character
                .as_mut()
                .expect("checked above");
            character.ability_used_this_match = true;
            state.add_log(format!("{username} used Paladin's Smite!"));
        }
        PlayerClass::Rogue => {
            // Steal from the first other player sharing the tile.
            let position = state.players[player_index].position;
            let target = state
                .players
                .iter()
                .enumerate()
                .find(|(i, p)| *i != player_index && p.position == position)
                .map(|(i, _)| i);
            if let Some(target_index) = target {
                let stolen = state.players[target_index].gold.min(10);
                state.players[target_index].remove_gold(stolen);
                state.players[player_index].add_gold(stolen);
                let victim = state.players[target_index].username.clone();
                state.add_log(format!("{username} stole {stolen} gold from {victim}!"));
            }
        }
        PlayerClass::Cleric => {
            let character = state.players[player_index]
                .character
                .as_mut()
                .expect("checked above");
            character.heal(20);
            state.add_log(format!("{username} healed for 20 HP!"));
        }
        PlayerClass::Bard => {
            for player in &mut state.players {
                if let Some(character) = player.character.as_mut() {
                    character.heal(5);
                }
            }
            state.add_log(format!("{username} played an inspiring song!"));
        }
        // Narrative-only abilities.
        PlayerClass::Mage => state.add_log(format!("{username} cast Fireball!")),
        PlayerClass::Ranger => state.add_log(format!("{username} aims carefully!")),
        PlayerClass::Necromancer => state.add_log(format!("{username} used Life Drain!")),
    }

    if let Some(character) = state.players[player_index].character.as_mut() {
        character.ability_used_this_turn = true;
    }
    Ok(())
}
