//! The autonomous player.
//!
//! A bot turn runs through the same turn machine as a human: it may use
//! its ability, logs what it is aiming for, rolls, optionally burns a
//! Halfling reroll on a bad landing, and resolves like any other roll.
//! The lookahead only narrates intent — it never changes dice mechanics.

use crate::board::{Tile, TileKind};
use crate::dice::Dice;
use crate::error::GameError;
use crate::rules::{PlayerClass, Race};
use crate::state::{GameState, GameStatus};
use crate::turn::{self, TurnOutcome};
use crate::{ability, character::Character};

/// Executes one full bot turn for the seat at `bot_index`.
///
/// The caller schedules this after a delay, so everything is re-validated
/// on arrival: the seat must still be a bot, still current, and still
/// waiting for its roll.
pub fn take_turn<D: Dice + ?Sized>(
    state: &mut GameState,
    bot_index: usize,
    dice: &mut D,
) -> Result<TurnOutcome, GameError> {
    if state.status != GameStatus::InProgress {
        return Err(GameError::StateConflict("game not in progress".into()));
    }
    if bot_index >= state.players.len() || !state.players[bot_index].is_bot {
        return Err(GameError::InvalidTurn("seat is not a bot".into()));
    }
    if state.current_player_index % state.players.len() != bot_index {
        return Err(GameError::InvalidTurn("bot is not the current player".into()));
    }
    if !state.waiting_for_roll() {
        return Err(GameError::InvalidTurn("not waiting for a roll".into()));
    }

    if should_use_ability(state, bot_index, dice) {
        match ability::use_ability(state, bot_index, dice) {
            Ok(()) => {
                let username = state.players[bot_index].username.clone();
                state.add_log(format!("{username} (Bot) used their class ability!"));
            }
            Err(err) => tracing::debug!(error = %err, "bot could not use ability"),
        }
    }

    evaluate_board(state, bot_index);

    let mut base_roll = dice.roll_die();
    if should_reroll(state, bot_index, base_roll) {
        state.players[bot_index]
            .character
            .as_mut()
            .expect("reroll implies a character")
            .use_reroll();
        let username = state.players[bot_index].username.clone();
        state.add_log(format!("{username} (Bot) uses a reroll!"));
        base_roll = dice.roll_die();
    }

    Ok(turn::resolve_roll_and_advance(state, bot_index, base_roll, dice))
}

/// Per-class decision rule for spending the ability before rolling.
pub fn should_use_ability<D: Dice + ?Sized>(
    state: &GameState,
    bot_index: usize,
    dice: &mut D,
) -> bool {
    let bot = &state.players[bot_index];
    let Some(character) = bot.character.as_ref() else {
        return false;
    };
    if character.ability_used_this_turn {
        return false;
    }

    match character.player_class {
        // Offensive abilities when healthy, most of the time.
        PlayerClass::Warrior | PlayerClass::Paladin | PlayerClass::Necromancer => {
            hp_fraction(character) > 0.5 && dice.chance(0.6)
        }
        // Heal when hurting.
        PlayerClass::Cleric => hp_fraction(character) < 0.6,
        // Utility classes fire opportunistically.
        PlayerClass::Mage | PlayerClass::Ranger | PlayerClass::Bard => dice.chance(0.4),
        // Steal when meaningfully behind someone.
        PlayerClass::Rogue => state
            .players
            .iter()
            .any(|p| p.gold > bot.gold + 15),
    }
}

/// Scores every reachable tile (rolls 1–6) and logs the most desirable
/// target. Returns `(target_position, best_score)`.
pub fn evaluate_board(state: &mut GameState, bot_index: usize) -> (i32, i32) {
    let current_position = state.players[bot_index].position;
    let mut best_score = i32::MIN;
    let mut target_position = current_position;

    for roll in 1..=6 {
        let future_position = (current_position + roll).rem_euclid(state.board.size());
        let score = tile_score(state, bot_index, state.board.tile(future_position));
        if score > best_score {
            best_score = score;
            target_position = future_position;
        }
    }

    if best_score > 0 {
        let username = state.players[bot_index].username.clone();
        state.add_log(format!(
            "{username} (Bot) is aiming for position {target_position}"
        ));
    }
    (target_position, best_score)
}

/// How desirable a tile is for this bot. Higher is better.
fn tile_score(state: &GameState, bot_index: usize, tile: &Tile) -> i32 {
    let bot = &state.players[bot_index];
    let mut score = match tile.kind {
        TileKind::Treasure => 20,
        TileKind::Monster => {
            let strength = bot.character.as_ref().map_or(10, |c| c.attack);
            if strength >= tile.monster_level * 3 { 15 } else { -10 }
        }
        TileKind::Shop => 10,
        TileKind::Event => 5,
        TileKind::Trap => -15,
        TileKind::Portal => -5,
        TileKind::Normal | TileKind::Start => 0,
    };

    if let Some(character) = bot.character.as_ref() {
        let hp = hp_fraction(character);
        if hp < 0.3 {
            if tile.kind == TileKind::Monster {
                score -= 20;
            }
            if tile.kind == TileKind::Trap {
                score -= 10;
            }
        }
        if hp > 0.7 && tile.kind == TileKind::Monster {
            score += 10;
        }
        if bot.gold < 20 && tile.kind == TileKind::Treasure {
            score += 15;
        }
        if character.race == Race::Goblin && tile.kind == TileKind::Trap {
            score += 20;
        }
        if character.race == Race::Dwarf && tile.kind == TileKind::Treasure {
            score += 10;
        }
    }

    // Standing relative to the richest other player.
    let max_other = state
        .players
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != bot_index)
        .map(|(_, p)| p.gold)
        .max()
        .unwrap_or(0);
    if bot.gold < max_other - 20
        && matches!(tile.kind, TileKind::Monster | TileKind::Event)
    {
        score += 8;
    }
    if bot.gold > max_other {
        if tile.kind == TileKind::Monster {
            score -= 5;
        }
        if tile.kind == TileKind::Treasure {
            score += 5;
        }
    }

    score
}

/// Reroll heuristic for reroll-capable bots: dodge traps, dodge monsters
/// when frail, keep treasure and shop landings, retry weak rolls.
pub fn should_reroll(state: &GameState, bot_index: usize, raw_roll: i32) -> bool {
    let bot = &state.players[bot_index];
    let Some(character) = bot.character.as_ref() else {
        return false;
    };
    if !character.can_reroll() {
        return false;
    }

    let future_position = (bot.position + raw_roll).rem_euclid(state.board.size());
    let tile = state.board.tile(future_position);
    match tile.kind {
        TileKind::Trap => true,
        TileKind::Monster if hp_fraction(character) < 0.4 => true,
        TileKind::Treasure | TileKind::Shop => false,
        _ => raw_roll <= 2,
    }
}

/// Picks a strategic class/race pairing from three archetype buckets.
pub fn assign_character<D: Dice + ?Sized>(dice: &mut D) -> (PlayerClass, Race) {
    match dice.pick(8) % 3 {
        // Aggressive
        0 => (
            if dice.chance(0.5) { PlayerClass::Warrior } else { PlayerClass::Paladin },
            if dice.chance(0.5) { Race::Orc } else { Race::Dragonborn },
        ),
        // Strategic
        1 => (
            if dice.chance(0.5) { PlayerClass::Mage } else { PlayerClass::Ranger },
            if dice.chance(0.5) { Race::Human } else { Race::Elf },
        ),
        // Chaos
        _ => (
            if dice.chance(0.5) { PlayerClass::Rogue } else { PlayerClass::Bard },
            if dice.chance(0.5) { Race::Tiefling } else { Race::Halfling },
        ),
    }
}

fn hp_fraction(character: &Character) -> f64 {
    character.current_hp as f64 / character.max_hp as f64
}
