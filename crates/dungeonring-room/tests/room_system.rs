//! Integration tests for the room layer: registry lifecycle, the actor's
//! turn routing, broadcast fan-out, and bot scheduling.

use std::sync::Arc;
use std::time::Duration;

use dungeonring_engine::{GameError, GameStatus};
use dungeonring_protocol::{ClientCommand, ConnectionId, EventKind, GameEvent, PlayerId, RoomId};
use dungeonring_room::{CreateRoom, RoomError, RoomRegistry};
use tokio::sync::mpsc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pid(id: u64) -> PlayerId {
    PlayerId(id)
}

fn settings(max_players: usize, bot_count: usize) -> CreateRoom {
    CreateRoom {
        name: "test room".into(),
        max_players,
        is_private: false,
        bot_count,
    }
}

/// Creates a room hosted by alice (pid 1) with bob (pid 2) joined.
async fn two_human_room(registry: &RoomRegistry) -> RoomId {
    let room = registry
        .create(settings(4, 0), pid(1), "alice")
        .await
        .unwrap();
    registry.join(&room, pid(2), "bob").await.unwrap();
    room
}

/// Selects Warrior/Human for both humans and starts the game.
async fn started_room(registry: &RoomRegistry) -> RoomId {
    let room = two_human_room(registry).await;
    registry.select_character(&room, pid(1), 1, 1).await.unwrap();
    registry.select_character(&room, pid(2), 1, 1).await.unwrap();
    registry.start(&room).await.unwrap();
    room
}

// =========================================================================
// Registry lifecycle
// =========================================================================

#[tokio::test]
async fn test_create_seats_host_first() {
    init_tracing();
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 0), pid(1), "alice")
        .await
        .unwrap();

    assert_eq!(room.as_str().len(), 8);

    let info = registry.get_room(&room).await.unwrap();
    assert_eq!(info.host_id, pid(1));
    assert_eq!(info.player_count, 1);
    assert_eq!(info.status, GameStatus::Waiting);

    let state = registry.get_game_state(&room).await.unwrap();
    assert_eq!(state.players[0].username, "alice");
    assert!(!state.players[0].is_bot);
}

#[tokio::test]
async fn test_create_rejects_capacity_out_of_range() {
    let registry = RoomRegistry::new();
    for max_players in [0, 1, 5] {
        let result = registry
            .create(settings(max_players, 0), pid(1), "alice")
            .await;
        assert!(matches!(result, Err(RoomError::InvalidCapacity(_))));
    }
}

#[tokio::test]
async fn test_create_rejects_more_bots_than_seats() {
    let registry = RoomRegistry::new();
    let result = registry.create(settings(2, 2), pid(1), "alice").await;
    assert!(matches!(result, Err(RoomError::InvalidCapacity(3))));
}

#[tokio::test]
async fn test_create_appends_requested_bots_after_host() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 2), pid(1), "alice")
        .await
        .unwrap();

    let state = registry.get_game_state(&room).await.unwrap();
    let names: Vec<&str> = state.players.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "Bot 1", "Bot 2"]);
    assert!(state.players[1].is_bot);
}

#[tokio::test]
async fn test_add_bot_numbering_counts_only_bots() {
    let registry = RoomRegistry::new();
    let room = two_human_room(&registry).await;

    assert_eq!(registry.add_bot(&room).await.unwrap(), "Bot 1");
    assert_eq!(registry.add_bot(&room).await.unwrap(), "Bot 2");
}

#[tokio::test]
async fn test_join_full_room_rejected() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(2, 0), pid(1), "alice")
        .await
        .unwrap();

    registry.join(&room, pid(2), "bob").await.unwrap();
    let result = registry.join(&room, pid(3), "carol").await;
    assert!(matches!(result, Err(RoomError::RoomFull(_))));
}

#[tokio::test]
async fn test_join_twice_rejected() {
    let registry = RoomRegistry::new();
    let room = two_human_room(&registry).await;

    let result = registry.join(&room, pid(2), "bob").await;
    assert!(matches!(result, Err(RoomError::AlreadyInRoom(_, _))));
}

#[tokio::test]
async fn test_join_unknown_room_rejected() {
    let registry = RoomRegistry::new();
    let result = registry
        .join(&RoomId::new("missing0"), pid(1), "alice")
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

#[tokio::test]
async fn test_join_after_start_rejected() {
    let registry = RoomRegistry::new();
    let room = started_room(&registry).await;

    let result = registry.join(&room, pid(3), "carol").await;
    assert!(matches!(result, Err(RoomError::InvalidState(_))));
}

#[tokio::test]
async fn test_leave_reassigns_host_to_first_remaining_human() {
    let registry = RoomRegistry::new();
    let room = two_human_room(&registry).await;

    registry.leave(&room, pid(1)).await.unwrap();

    let info = registry.get_room(&room).await.unwrap();
    assert_eq!(info.host_id, pid(2));
    assert_eq!(info.player_count, 1);
}

#[tokio::test]
async fn test_leave_of_unknown_player_rejected() {
    let registry = RoomRegistry::new();
    let room = two_human_room(&registry).await;

    let result = registry.leave(&room, pid(99)).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::PlayerNotFound(_)))
    ));
}

#[tokio::test]
async fn test_room_destroyed_when_last_human_leaves() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 1), pid(1), "alice")
        .await
        .unwrap();

    // Only a bot remains after the host leaves, so the room goes away.
    registry.leave(&room, pid(1)).await.unwrap();

    let result = registry.get_room(&room).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn test_available_filters_private_started_and_full() {
    let registry = RoomRegistry::new();

    let open = registry
        .create(settings(4, 0), pid(1), "alice")
        .await
        .unwrap();
    let private = CreateRoom {
        is_private: true,
        ..settings(4, 0)
    };
    registry.create(private, pid(2), "bob").await.unwrap();
    let full = registry
        .create(settings(2, 1), pid(3), "carol")
        .await
        .unwrap();

    let available = registry.available().await;
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].room_id, open);
    assert_ne!(available[0].room_id, full);
    assert_eq!(registry.list().await.len(), 3);
}

// =========================================================================
// Turn routing through the actor
// =========================================================================

#[tokio::test]
async fn test_start_requires_every_human_to_have_a_character() {
    let registry = RoomRegistry::new();
    let room = two_human_room(&registry).await;

    let result = registry.start(&room).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::StateConflict(_)))
    ));

    registry.select_character(&room, pid(1), 1, 1).await.unwrap();
    let result = registry.start(&room).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::StateConflict(_)))
    ));

    registry.select_character(&room, pid(2), 2, 2).await.unwrap();
    registry.start(&room).await.unwrap();

    let state = registry.get_game_state(&room).await.unwrap();
    assert_eq!(state.status, GameStatus::InProgress);
    assert_eq!(state.current_player_index, 0);
    assert!(state.waiting_for_roll());
}

#[tokio::test]
async fn test_select_with_unknown_ids_rejected() {
    let registry = RoomRegistry::new();
    let room = two_human_room(&registry).await;

    let result = registry.select_character(&room, pid(1), 9, 1).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::InvalidSelection(_)))
    ));
}

#[tokio::test]
async fn test_bots_receive_characters_on_start() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 2), pid(1), "alice")
        .await
        .unwrap();
    registry.select_character(&room, pid(1), 1, 1).await.unwrap();
    registry.start(&room).await.unwrap();

    let state = registry.get_game_state(&room).await.unwrap();
    for player in state.players.iter().filter(|p| p.is_bot) {
        assert!(player.character.is_some());
    }
}

#[tokio::test]
async fn test_roll_out_of_turn_rejected() {
    let registry = RoomRegistry::new();
    let room = started_room(&registry).await;

    let result = registry.roll(&room, pid(2)).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::InvalidTurn(_)))
    ));
}

#[tokio::test]
async fn test_roll_advances_to_the_next_player() {
    let registry = RoomRegistry::new();
    let room = started_room(&registry).await;

    registry.roll(&room, pid(1)).await.unwrap();

    // Alice's turn is over; rolling again is out of turn, bob may roll.
    let result = registry.roll(&room, pid(1)).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::InvalidTurn(_)))
    ));
    registry.roll(&room, pid(2)).await.unwrap();
}

#[tokio::test]
async fn test_reroll_without_the_racial_perk_rejected() {
    let registry = RoomRegistry::new();
    let room = started_room(&registry).await;

    // Humans can't reroll.
    let result = registry.reroll(&room, pid(1)).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::StateConflict(_)))
    ));
}

#[tokio::test]
async fn test_halfling_reroll_turn_completes_and_play_continues() {
    let registry = RoomRegistry::new();
    let room = two_human_room(&registry).await;
    // Alice takes Bard/Halfling so her roll carries the reroll offer.
    registry.select_character(&room, pid(1), 7, 5).await.unwrap();
    registry.select_character(&room, pid(2), 1, 1).await.unwrap();
    registry.start(&room).await.unwrap();

    // Her roll parks on the offer instead of passing the turn.
    registry.roll(&room, pid(1)).await.unwrap();
    let state = registry.get_game_state(&room).await.unwrap();
    assert!(state.waiting_for_reroll());
    assert_eq!(state.current_player_index, 0);

    // Spending it ends the turn; bob is up and can act.
    registry.reroll(&room, pid(1)).await.unwrap();
    let state = registry.get_game_state(&room).await.unwrap();
    assert!(state.waiting_for_roll());
    assert_eq!(state.current_player_index, 1);
    assert!(
        state
            .game_log
            .iter()
            .any(|line| line.contains("alice rerolled and got "))
    );

    registry.roll(&room, pid(2)).await.unwrap();
}

#[tokio::test]
async fn test_ability_once_per_turn() {
    let registry = RoomRegistry::new();
    let room = started_room(&registry).await;

    registry.use_ability(&room, pid(1)).await.unwrap();
    let result = registry.use_ability(&room, pid(1)).await;
    assert!(matches!(
        result,
        Err(RoomError::Game(GameError::AbilityUnavailable(_)))
    ));
}

#[tokio::test]
async fn test_end_finishes_and_scores() {
    let registry = RoomRegistry::new();
    let room = started_room(&registry).await;

    registry.end(&room).await.unwrap();

    let state = registry.get_game_state(&room).await.unwrap();
    assert_eq!(state.status, GameStatus::Finished);
    assert!(state.end_time.is_some());
    // Scores tie at zero; the first seat wins the tie.
    assert_eq!(state.winner_id, Some(pid(1)));

    let result = registry.end(&room).await;
    assert!(matches!(result, Err(RoomError::InvalidState(_))));
}

#[tokio::test]
async fn test_dispatch_routes_wire_commands() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 0), pid(1), "alice")
        .await
        .unwrap();

    // Decoded straight off the wire, then routed by target room.
    let json = format!(r#"{{"type":"JOIN_ROOM","roomId":"{room}"}}"#);
    let command: ClientCommand = serde_json::from_str(&json).unwrap();
    registry.dispatch(pid(2), "bob", command).await.unwrap();

    let info = registry.get_room(&room).await.unwrap();
    assert_eq!(info.player_count, 2);

    let roll = ClientCommand::RollDice { room_id: room.clone() };
    let result = registry.dispatch(pid(2), "bob", roll).await;
    assert!(
        matches!(result, Err(RoomError::Game(GameError::StateConflict(_)))),
        "rolling before the game starts is a state conflict"
    );
}

// =========================================================================
// Broadcast fan-out
// =========================================================================

#[tokio::test]
async fn test_events_fan_out_past_a_dead_connection() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 0), pid(1), "alice")
        .await
        .unwrap();

    let hub = registry.hub();
    let (tx_live, mut rx_live) = mpsc::unbounded_channel();
    let (tx_dead, rx_dead) = mpsc::unbounded_channel();
    drop(rx_dead);
    hub.subscribe(room.clone(), ConnectionId(1), tx_live);
    hub.subscribe(room.clone(), ConnectionId(2), tx_dead);

    registry.join(&room, pid(2), "bob").await.unwrap();

    // The live connection sees the join followed by a state snapshot.
    let bytes = rx_live.recv().await.expect("live connection gets events");
    let event: GameEvent = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(event.kind, EventKind::PlayerJoined);
    assert_eq!(event.message.as_deref(), Some("bob joined the game"));

    let bytes = rx_live.recv().await.unwrap();
    let event: GameEvent = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(event.kind, EventKind::GameState);
    assert_eq!(event.game_state.unwrap()["players"][1]["username"], "bob");

    // The dead connection was pruned instead of blocking anyone.
    assert_eq!(hub.subscriber_count(&room), 1);
}

#[tokio::test]
async fn test_destroy_unsubscribes_connections() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 0), pid(1), "alice")
        .await
        .unwrap();

    let hub = registry.hub();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.subscribe(room.clone(), ConnectionId(1), tx);

    registry.destroy(&room).await.unwrap();
    assert_eq!(hub.subscriber_count(&room), 0);
    assert!(rx.try_recv().is_err(), "nothing arrives after destruction");

    let result = registry.get_room(&room).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

// =========================================================================
// Bot scheduling
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_bot_takes_its_turn_after_the_delay() {
    init_tracing();
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 1), pid(1), "alice")
        .await
        .unwrap();
    registry.select_character(&room, pid(1), 1, 1).await.unwrap();
    registry.start(&room).await.unwrap();

    // Alice rolls; the turn passes to the bot, whose move is delayed.
    registry.roll(&room, pid(1)).await.unwrap();
    let state = registry.get_game_state(&room).await.unwrap();
    assert_eq!(state.current_player_index, 1);

    tokio::time::sleep(Duration::from_secs(2)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let state = registry.get_game_state(&room).await.unwrap();
    assert!(
        state.game_log.iter().any(|line| line.starts_with("Bot 1")),
        "bot should have acted: {:?}",
        state.game_log
    );
    // The bot's turn ended and the round counter wrapped.
    assert!(state.current_round >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_bot_still_acts_after_an_earlier_seat_leaves() {
    init_tracing();
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 1), pid(1), "alice")
        .await
        .unwrap();
    registry.join(&room, pid(2), "bob").await.unwrap();
    registry.select_character(&room, pid(1), 1, 1).await.unwrap();
    registry.select_character(&room, pid(2), 1, 1).await.unwrap();
    registry.start(&room).await.unwrap();

    // Alice's roll passes the turn to the bot at seat 1.
    registry.roll(&room, pid(1)).await.unwrap();
    let state = registry.get_game_state(&room).await.unwrap();
    assert_eq!(state.current_player_index, 1);
    assert!(state.players[1].is_bot);

    // She leaves while the bot's move is still pending; the bot shifts
    // down to seat 0 and its timer has to follow.
    registry.leave(&room, pid(1)).await.unwrap();
    let state = registry.get_game_state(&room).await.unwrap();
    assert!(state.players[0].is_bot);
    assert_eq!(state.current_player_index, 0);

    tokio::time::sleep(Duration::from_secs(2)).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    let state = registry.get_game_state(&room).await.unwrap();
    assert!(
        state
            .game_log
            .iter()
            .any(|line| line.contains("Bot 1 rolled a ")),
        "bot should have acted after the seats shifted: {:?}",
        state.game_log
    );
}

#[tokio::test(start_paused = true)]
async fn test_destroy_cancels_the_pending_bot_turn() {
    let registry = RoomRegistry::new();
    let room = registry
        .create(settings(4, 1), pid(1), "alice")
        .await
        .unwrap();
    registry.select_character(&room, pid(1), 1, 1).await.unwrap();
    registry.start(&room).await.unwrap();
    registry.roll(&room, pid(1)).await.unwrap();

    // Destroy the room while the bot's turn is still pending.
    registry.destroy(&room).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;

    let result = registry.get_room(&room).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test]
async fn test_concurrent_rolls_are_applied_one_at_a_time() {
    let registry = Arc::new(RoomRegistry::new());
    let room = started_room(&registry).await;

    let mut tasks = Vec::new();
    for attempt in 0..16u64 {
        let registry = Arc::clone(&registry);
        let room = room.clone();
        let player = pid(attempt % 2 + 1);
        tasks.push(tokio::spawn(async move {
            registry.roll(&room, player).await.is_ok()
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    // The actor serializes everything: out-of-turn rolls fail cleanly
    // and the surviving state is coherent.
    assert!(successes >= 1);
    let state = registry.get_game_state(&room).await.unwrap();
    assert!(state.current_player_index < state.players.len());
    assert!(matches!(
        state.status,
        GameStatus::InProgress | GameStatus::Finished
    ));
    let rolls = state
        .game_log
        .iter()
        .filter(|line| line.contains(" rolled a "))
        .count();
    assert_eq!(rolls, successes);
}
