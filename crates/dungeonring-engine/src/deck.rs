//! The event card deck: 12 fixed bless/curse cards drawn on Event tiles.
//!
//! Half the bless cards (double treasure, bonus movement, shield, lucky
//! reroll) are narration only — there is no pending-modifier model, and
//! adding one would be a rules change, not a bug fix. The remaining
//! effects apply immediately.

use serde::{Deserialize, Serialize};

use dungeonring_protocol::GameEvent;

use crate::dice::Dice;
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardCategory {
    Bless,
    Curse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCard {
    BlessGold,
    BlessMove,
    BlessShield,
    BlessHeal,
    BlessReroll,
    BlessSteal,
    CurseLoseTurn,
    CurseDropGold,
    CurseSwap,
    CurseDamage,
    CurseTeleport,
    CurseMoveBack,
}

impl EventCard {
    pub const ALL: [EventCard; 12] = [
        EventCard::BlessGold,
        EventCard::BlessMove,
        EventCard::BlessShield,
        EventCard::BlessHeal,
        EventCard::BlessReroll,
        EventCard::BlessSteal,
        EventCard::CurseLoseTurn,
        EventCard::CurseDropGold,
        EventCard::CurseSwap,
        EventCard::CurseDamage,
        EventCard::CurseTeleport,
        EventCard::CurseMoveBack,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventCard::BlessGold => "Gold Rush",
            EventCard::BlessMove => "Swift Feet",
            EventCard::BlessShield => "Divine Shield",
            EventCard::BlessHeal => "Healing Light",
            EventCard::BlessReroll => "Lucky Star",
            EventCard::BlessSteal => "Pickpocket",
            EventCard::CurseLoseTurn => "Stunned",
            EventCard::CurseDropGold => "Greedy Ghost",
            EventCard::CurseSwap => "Confusion",
            EventCard::CurseDamage => "Poison",
            EventCard::CurseTeleport => "Warp",
            EventCard::CurseMoveBack => "Stumble",
        }
    }

    pub fn category(self) -> CardCategory {
        match self {
            EventCard::BlessGold
            | EventCard::BlessMove
            | EventCard::BlessShield
            | EventCard::BlessHeal
            | EventCard::BlessReroll
            | EventCard::BlessSteal => CardCategory::Bless,
            _ => CardCategory::Curse,
        }
    }
}

/// Uniform draw from the full deck.
pub fn draw<D: Dice + ?Sized>(dice: &mut D) -> EventCard {
    EventCard::ALL[dice.pick(EventCard::ALL.len())]
}

/// Applies a card to the player at `player_index`, returning the event
/// to broadcast.
pub fn apply<D: Dice + ?Sized>(
    state: &mut GameState,
    player_index: usize,
    card: EventCard,
    dice: &mut D,
) -> GameEvent {
    let username = state.players[player_index].username.clone();
    match card {
        EventCard::BlessGold => {
            state.add_log(format!("{username} received Gold Rush blessing!"));
            GameEvent::event_card("Gold Rush: Double gold from next treasure!")
        }
        EventCard::BlessMove => {
            state.add_log(format!("{username} received Swift Feet blessing!"));
            GameEvent::event_card("Swift Feet: +3 movement next turn!")
        }
        EventCard::BlessShield => {
            state.add_log(format!("{username} received Divine Shield blessing!"));
            GameEvent::event_card("Divine Shield: Immune to next attack!")
        }
        EventCard::BlessHeal => {
            if let Some(character) = state.players[player_index].character.as_mut() {
                character.heal(20);
                state.add_log(format!("{username} healed for 20 HP!"));
            }
            GameEvent::event_card("Healing Light: Restored 20 HP!")
        }
        EventCard::BlessReroll => {
            state.add_log(format!("{username} received Lucky Star blessing!"));
            GameEvent::event_card("Lucky Star: Reroll next dice roll!")
        }
        EventCard::BlessSteal => {
            if let Some(target_index) = random_other_player(state, player_index, dice) {
                let stolen = state.players[target_index].gold.min(10);
                state.players[target_index].remove_gold(stolen);
                state.players[player_index].add_gold(stolen);
                let victim = state.players[target_index].username.clone();
                state.add_log(format!("{username} stole {stolen} gold from {victim}!"));
            }
            GameEvent::event_card("Pickpocket: Stole 10 gold!")
        }
        EventCard::CurseLoseTurn => {
            state.players[player_index].skip_next_turn();
            state.add_log(format!("{username} is stunned and will skip next turn!"));
            GameEvent::event_card("Stunned: Skip next turn!")
        }
        EventCard::CurseDropGold => {
            let dropped = state.players[player_index].gold.min(15);
            state.players[player_index].remove_gold(dropped);
            state.add_log(format!("{username} dropped {dropped} gold!"));
            GameEvent::event_card(format!("Greedy Ghost: Dropped {dropped} gold!"))
        }
        EventCard::CurseSwap => {
            if let Some(target_index) = random_other_player(state, player_index, dice) {
                let own = state.players[player_index].position;
                state.players[player_index].position = state.players[target_index].position;
                state.players[target_index].position = own;
                let other = state.players[target_index].username.clone();
                state.add_log(format!("{username} swapped positions with {other}!"));
            }
            GameEvent::event_card("Confusion: Swapped positions!")
        }
        EventCard::CurseDamage => {
            if let Some(character) = state.players[player_index].character.as_mut() {
                character.take_damage(10);
                state.add_log(format!("{username} took 10 poison damage!"));
            }
            GameEvent::event_card("Poison: Took 10 damage!")
        }
        EventCard::CurseTeleport => {
            let destination = dice.pick(state.board.size() as usize) as i32;
            state.players[player_index].position = destination;
            state.add_log(format!("{username} was warped to position {destination}!"));
            GameEvent::event_card("Warp: Teleported randomly!")
        }
        EventCard::CurseMoveBack => {
            let size = state.board.size();
            let destination = (state.players[player_index].position - 3).rem_euclid(size);
            state.players[player_index].position = destination;
            state.add_log(format!("{username} stumbled back to position {destination}!"));
            GameEvent::event_card("Stumble: Moved back 3 tiles!")
        }
    }
}

/// Uniform pick over living players other than the actor, or `None`.
fn random_other_player<D: Dice + ?Sized>(
    state: &GameState,
    player_index: usize,
    dice: &mut D,
) -> Option<usize> {
    let candidates: Vec<usize> = state
        .players
        .iter()
        .enumerate()
        .filter(|(i, p)| *i != player_index && p.is_alive())
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[dice.pick(candidates.len())])
}
