//! The turn state machine.
//!
//! Each public operation validates, mutates the [`GameState`], and
//! returns a [`TurnOutcome`]: the events to broadcast plus, when the
//! turn passed to a bot, the seat index the caller should schedule an
//! autonomous turn for. Errors are detected before any mutation, so a
//! failed call leaves the state untouched.

use dungeonring_protocol::{GameEvent, PlayerId};

use crate::board::TileKind;
use crate::dice::Dice;
use crate::error::GameError;
use crate::rules::{PlayerClass, Race};
use crate::state::{GameState, GameStatus, now_millis};
use crate::{ability, bot, combat, deck};

/// What a mutation produced: events for fan-out and an optional bot seat
/// that became the current player.
#[derive(Debug, Default)]
pub struct TurnOutcome {
    pub events: Vec<GameEvent>,
    pub next_bot: Option<usize>,
}

impl TurnOutcome {
    fn events(events: Vec<GameEvent>) -> Self {
        Self {
            events,
            next_bot: None,
        }
    }
}

/// Starts the match: every human must have a character, bots get one
/// assigned, hp and ability flags reset, and seat 0 becomes current.
pub fn start<D: Dice + ?Sized>(
    state: &mut GameState,
    dice: &mut D,
) -> Result<TurnOutcome, GameError> {
    if state.status != GameStatus::Waiting {
        return Err(GameError::StateConflict("game already started".into()));
    }
    if state
        .players
        .iter()
        .any(|p| !p.is_bot && p.character.is_none())
    {
        return Err(GameError::StateConflict(
            "not all players have selected characters".into(),
        ));
    }

    for player in &mut state.players {
        if player.is_bot && player.character.is_none() {
            let (class, race) = bot::assign_character(dice);
            player.select_character(class, race);
        }
        if let Some(character) = player.character.as_mut() {
            character.reset_for_new_match();
        }
    }

    state.status = GameStatus::InProgress;
    state.start_time = Some(now_millis());
    state.current_player_index = 0;
    state.current_round = 0;
    state.set_waiting_for_roll(true);
    state.add_log("Game started!");

    Ok(TurnOutcome {
        events: vec![GameEvent::game_started()],
        next_bot: current_bot(state),
    })
}

/// The current player rolls, moves, and resolves the landed tile. A
/// player still holding an unused reroll is then offered it instead of
/// the turn advancing; rolling again while the offer stands keeps the
/// result and ends the turn.
pub fn roll_dice<D: Dice + ?Sized>(
    state: &mut GameState,
    player_id: PlayerId,
    dice: &mut D,
) -> Result<TurnOutcome, GameError> {
    let player_index = require_current_player(state, player_id)?;
    if state.waiting_for_reroll() {
        // Keeping the previous roll: its resolution already happened,
        // only the turn hand-off is outstanding.
        state.set_waiting_for_reroll(false);
        let username = state.players[player_index].username.clone();
        state.add_log(format!("{username} keeps the roll"));
        return Ok(finish_turn(state, Vec::new()));
    }
    if !state.waiting_for_roll() {
        return Err(GameError::InvalidTurn("not waiting for a roll".into()));
    }
    let base_roll = dice.roll_die();
    let mut events = Vec::new();
    resolve_roll(state, player_index, base_roll, dice, &mut events, false);

    let offer_reroll = !state.is_finished()
        && state.players[player_index]
            .character
            .as_ref()
            .is_some_and(|c| c.can_reroll());
    if offer_reroll {
        state.set_waiting_for_reroll(true);
        let username = state.players[player_index].username.clone();
        state.add_log(format!("{username} may reroll!"));
        return Ok(TurnOutcome::events(events));
    }
    Ok(finish_turn(state, events))
}

/// The current player spends the offered reroll: throw again, re-resolve
/// movement and the landed tile from the new position, then end the turn.
/// Resolution runs twice within the logical turn, advancement only once.
pub fn reroll<D: Dice + ?Sized>(
    state: &mut GameState,
    player_id: PlayerId,
    dice: &mut D,
) -> Result<TurnOutcome, GameError> {
    let player_index = require_current_player(state, player_id)?;
    let can_reroll = state.players[player_index]
        .character
        .as_ref()
        .is_some_and(|c| c.can_reroll());
    if !state.waiting_for_reroll() || !can_reroll {
        return Err(GameError::StateConflict("cannot reroll".into()));
    }

    let character = state.players[player_index].character.as_mut();
    character.expect("checked above").use_reroll();

    let base_roll = dice.roll_die();
    let mut events = Vec::new();
    resolve_roll(state, player_index, base_roll, dice, &mut events, true);
    Ok(finish_turn(state, events))
}

/// Binds a class/race pair to a seat. Only legal while the room is
/// waiting for the match to start.
pub fn select_character(
    state: &mut GameState,
    player_id: PlayerId,
    class_id: u8,
    race_id: u8,
) -> Result<TurnOutcome, GameError> {
    if state.status != GameStatus::Waiting {
        return Err(GameError::StateConflict(
            "characters are locked once the game starts".into(),
        ));
    }
    let player_index = state
        .player_index(player_id)
        .ok_or(GameError::PlayerNotFound(player_id))?;
    let class = PlayerClass::from_id(class_id)
        .ok_or_else(|| GameError::InvalidSelection(format!("unknown class id {class_id}")))?;
    let race = Race::from_id(race_id)
        .ok_or_else(|| GameError::InvalidSelection(format!("unknown race id {race_id}")))?;

    state.players[player_index].select_character(class, race);
    let username = state.players[player_index].username.clone();
    state.add_log(format!(
        "{username} selected {} {}",
        race.name(),
        class.name()
    ));
    Ok(TurnOutcome::default())
}

/// Uses the player's class ability, enforcing the per-turn limit.
pub fn use_ability<D: Dice + ?Sized>(
    state: &mut GameState,
    player_id: PlayerId,
    dice: &mut D,
) -> Result<TurnOutcome, GameError> {
    let player_index = state
        .player_index(player_id)
        .ok_or(GameError::PlayerNotFound(player_id))?;
    if state.players[player_index].character.is_none() {
        return Err(GameError::CharacterNotSet);
    }
    if !ability::can_use_ability(state, player_index) {
        return Err(GameError::AbilityUnavailable(
            "ability already used this turn".into(),
        ));
    }
    ability::use_ability(state, player_index, dice)?;
    Ok(TurnOutcome::default())
}

/// Bot roll path: the reroll decision was already made before the draw,
/// so resolve and then end or advance immediately.
pub(crate) fn resolve_roll_and_advance<D: Dice + ?Sized>(
    state: &mut GameState,
    player_index: usize,
    base_roll: i32,
    dice: &mut D,
) -> TurnOutcome {
    let mut events = Vec::new();
    resolve_roll(state, player_index, base_roll, dice, &mut events, false);
    finish_turn(state, events)
}

fn require_current_player(state: &GameState, player_id: PlayerId) -> Result<usize, GameError> {
    if state.status != GameStatus::InProgress {
        return Err(GameError::StateConflict("game not in progress".into()));
    }
    let Some(current) = state.current_player() else {
        return Err(GameError::StateConflict("no current player".into()));
    };
    if current.id != Some(player_id) {
        return Err(GameError::InvalidTurn("not your turn".into()));
    }
    Ok(state.current_player_index % state.players.len())
}

fn resolve_roll<D: Dice + ?Sized>(
    state: &mut GameState,
    player_index: usize,
    base_roll: i32,
    dice: &mut D,
    events: &mut Vec<GameEvent>,
    rerolled: bool,
) {
    state.last_dice_roll = base_roll;
    state.set_waiting_for_roll(false);

    let username = state.players[player_index].username.clone();
    let race = state.players[player_index]
        .character
        .as_ref()
        .map(|c| c.race);

    let mut roll = base_roll;
    if let Some(race) = race {
        roll += race.bonuses().roll_bonus;
    }
    let line = if rerolled {
        format!("{username} rerolled and got {roll}!")
    } else {
        format!("{username} rolled a {roll}!")
    };
    state.add_log(line);

    // Elves gain bonus movement on a strong throw of the die itself.
    if race == Some(Race::Elf) && base_roll >= 5 {
        roll += Race::Elf.bonuses().movement_bonus;
        state.add_log(format!("{username} (Elf) moves +1 tile!"));
    }
    events.push(GameEvent::dice_rolled(roll));

    let new_position = (state.players[player_index].position + roll).rem_euclid(state.board.size());
    state.players[player_index].position = new_position;
    state.add_log(format!("{username} moved to position {new_position}"));
    events.push(GameEvent::player_moved(&username, new_position as usize));

    resolve_tile(state, player_index, dice, events);
}

fn resolve_tile<D: Dice + ?Sized>(
    state: &mut GameState,
    player_index: usize,
    dice: &mut D,
    events: &mut Vec<GameEvent>,
) {
    let tile = *state.board.tile(state.players[player_index].position);
    state.last_event = Some(format!("Landed on {}", tile.kind.name()));
    let username = state.players[player_index].username.clone();

    match tile.kind {
        TileKind::Monster => {
            let Some(character) = state.players[player_index].character.as_ref() else {
                return;
            };
            let result = combat::resolve(character, tile.monster_level, dice);
            if result.damage_taken > 0 {
                state.players[player_index]
                    .character
                    .as_mut()
                    .expect("checked above")
                    .take_damage(result.damage_taken);
            }
            let level = tile.monster_level;
            if result.victory {
                state.players[player_index].monsters_defeated += 1;
                let reward = 5 * level + dice.roll_die();
                state.players[player_index].add_gold(reward);
                state.add_log(format!(
                    "{username} defeated a level {level} monster and found {reward} gold!"
                ));
                events.push(GameEvent::combat_result(
                    format!("Victory! Found {reward} gold"),
                    true,
                ));
            } else {
                let damage = result.damage_taken;
                state.add_log(format!(
                    "{username} was defeated by a level {level} monster and took {damage} damage!"
                ));
                events.push(GameEvent::combat_result(
                    format!("Defeat! Took {damage} damage"),
                    false,
                ));
            }
        }
        TileKind::Treasure => {
            let mut gold = tile.treasure_amount;
            if let Some(character) = state.players[player_index].character.as_ref() {
                if character.race == Race::Dwarf {
                    gold += character.race.bonuses().gold_bonus;
                }
            }
            state.players[player_index].add_gold(gold);
            state.add_log(format!("{username} found a treasure with {gold} gold!"));
            events.push(GameEvent::treasure_found(gold));
        }
        TileKind::Trap => {
            let Some(character) = state.players[player_index].character.as_ref() else {
                return;
            };
            if character.race.is_trap_immune() {
                state.add_log(format!("{username} (Goblin) is immune to traps!"));
                events.push(GameEvent::event_card("Trap immunity activated!"));
            } else {
                let damage = tile.trap_damage;
                state.players[player_index]
                    .character
                    .as_mut()
                    .expect("checked above")
                    .take_damage(damage);
                state.add_log(format!(
                    "{username} triggered a trap and took {damage} damage!"
                ));
                events.push(GameEvent::trap_triggered(damage));
            }
        }
        TileKind::Portal => {
            let destination = dice.pick(state.board.size() as usize) as i32;
            state.players[player_index].position = destination;
            state.add_log(format!("{username} was teleported to position {destination}!"));
            events.push(GameEvent::event_card(format!(
                "Teleported to position {destination}"
            )));
        }
        TileKind::Event => {
            let card = deck::draw(dice);
            state.add_log(format!("Event card drawn: {}", card.name()));
            events.push(deck::apply(state, player_index, card, dice));
        }
        TileKind::Shop => {
            events.push(GameEvent::event_card("Welcome to the shop!"));
        }
        TileKind::Start | TileKind::Normal => {}
    }
}

fn finish_turn(state: &mut GameState, mut events: Vec<GameEvent>) -> TurnOutcome {
    if state.is_finished() {
        state.status = GameStatus::Finished;
        state.end_time = Some(now_millis());
        let winner = state.calculate_final_scores();
        let (winner_id, winner_name) = match winner {
            Some(index) => (
                state.players[index].id,
                state.players[index].username.clone(),
            ),
            None => (None, "nobody".to_string()),
        };
        state.add_log(format!("Game Over! Winner: {winner_name}"));
        events.push(GameEvent::game_over(winner_id, &winner_name));
        return TurnOutcome {
            events,
            next_bot: None,
        };
    }

    state.next_player();
    state.set_waiting_for_roll(true);
    TurnOutcome {
        events,
        next_bot: current_bot(state),
    }
}

fn current_bot(state: &GameState) -> Option<usize> {
    state
        .current_player()
        .filter(|p| p.is_bot)
        .map(|_| state.current_player_index)
}
