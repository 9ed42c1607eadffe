//! The room actor: one Tokio task owning one game.
//!
//! All mutations of a room's [`GameState`] flow through the actor's
//! command channel and are processed one at a time, so the engine never
//! needs locks. Callers hold a cheap, clonable [`RoomHandle`].
//!
//! Bot turns re-enter through the same channel: when a mutation leaves a
//! bot as the current player, the actor spawns a delayed task that sends
//! [`RoomCommand::BotTurn`] back to itself. The task handle is kept so a
//! destroyed room aborts its pending bot turn.

use std::sync::Arc;
use std::time::Duration;

use dungeonring_engine::state::now_millis;
use dungeonring_engine::{bot, turn, GameError, GameState, GameStatus, Player, TurnOutcome};
use dungeonring_protocol::{GameEvent, PlayerId, RoomId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{BroadcastHub, RoomError};

/// Pause before a bot takes its turn, so humans can follow along.
const BOT_TURN_DELAY: Duration = Duration::from_millis(1500);

/// Room metadata, fixed at creation except for the host seat.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub host_id: PlayerId,
    pub max_players: usize,
    pub is_private: bool,
    pub created_at: u64,
}

/// Snapshot of a room's headline state, for lobby listings.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub name: String,
    pub host_id: PlayerId,
    pub status: GameStatus,
    pub player_count: usize,
    pub max_players: usize,
    pub is_private: bool,
    pub created_at: u64,
}

impl RoomInfo {
    /// A room accepts new players while waiting and below capacity.
    pub fn is_joinable(&self) -> bool {
        self.status == GameStatus::Waiting && self.player_count < self.max_players
    }
}

/// Commands accepted by a room actor.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        username: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        /// Replies `true` when no humans remain and the room should be
        /// destroyed.
        reply: oneshot::Sender<Result<bool, RoomError>>,
    },
    AddBot {
        reply: oneshot::Sender<Result<String, RoomError>>,
    },
    Start {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    End {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    SelectCharacter {
        player_id: PlayerId,
        class_id: u8,
        race_id: u8,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Roll {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Reroll {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    UseAbility {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    /// Internal: a scheduled bot turn fires.
    BotTurn { player_index: usize },
    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },
    GetState {
        reply: oneshot::Sender<GameState>,
    },
    Shutdown,
}

/// A handle for sending commands to a running room actor.
///
/// Cloning is cheap. Every method maps a closed or full channel to
/// [`RoomError::Unavailable`].
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    async fn request<T>(
        &self,
        command: RoomCommand,
        rx: oneshot::Receiver<Result<T, RoomError>>,
    ) -> Result<T, RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        rx.await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    pub async fn join(
        &self,
        player_id: PlayerId,
        username: impl Into<String>,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        let command = RoomCommand::Join {
            player_id,
            username: username.into(),
            reply,
        };
        self.request(command, rx).await
    }

    /// Removes a player. Returns `true` when the room is left without
    /// humans and should be destroyed.
    pub async fn leave(&self, player_id: PlayerId) -> Result<bool, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Leave { player_id, reply }, rx).await
    }

    /// Seats a bot and returns its generated name.
    pub async fn add_bot(&self) -> Result<String, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::AddBot { reply }, rx).await
    }

    pub async fn start(&self) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Start { reply }, rx).await
    }

    /// Force-finishes the game, scoring whatever has happened so far.
    pub async fn end(&self) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::End { reply }, rx).await
    }

    pub async fn select_character(
        &self,
        player_id: PlayerId,
        class_id: u8,
        race_id: u8,
    ) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        let command = RoomCommand::SelectCharacter {
            player_id,
            class_id,
            race_id,
            reply,
        };
        self.request(command, rx).await
    }

    pub async fn roll(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Roll { player_id, reply }, rx).await
    }

    pub async fn reroll(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::Reroll { player_id, reply }, rx).await
    }

    pub async fn use_ability(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.request(RoomCommand::UseAbility { player_id, reply }, rx).await
    }

    pub async fn get_info(&self) -> Result<RoomInfo, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        rx.await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    pub async fn get_state(&self) -> Result<GameState, RoomError> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetState { reply })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        rx.await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Tells the actor to stop. The channel closing afterwards is normal.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// The actor task owning one room's state.
struct RoomActor {
    room: Room,
    game: GameState,
    rng: StdRng,
    hub: Arc<BroadcastHub>,
    /// Clone of our own command sender, for scheduled bot turns.
    sender: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// The pending bot-turn timer, aborted on shutdown.
    bot_task: Option<JoinHandle<()>>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room_id = %self.room.id, "room actor started");

        while let Some(command) = self.receiver.recv().await {
            if matches!(command, RoomCommand::Shutdown) {
                break;
            }
            self.handle(command);
        }

        if let Some(task) = self.bot_task.take() {
            task.abort();
        }
        tracing::info!(room_id = %self.room.id, "room actor stopped");
    }

    fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Join {
                player_id,
                username,
                reply,
            } => {
                let _ = reply.send(self.handle_join(player_id, username));
            }
            RoomCommand::Leave { player_id, reply } => {
                let _ = reply.send(self.handle_leave(player_id));
            }
            RoomCommand::AddBot { reply } => {
                let _ = reply.send(self.handle_add_bot());
            }
            RoomCommand::Start { reply } => {
                let _ = reply.send(self.handle_start());
            }
            RoomCommand::End { reply } => {
                let _ = reply.send(self.handle_end());
            }
            RoomCommand::SelectCharacter {
                player_id,
                class_id,
                race_id,
                reply,
            } => {
                let result = turn::select_character(&mut self.game, player_id, class_id, race_id)
                    .map(|outcome| self.publish(outcome))
                    .map_err(RoomError::from);
                let _ = reply.send(result);
            }
            RoomCommand::Roll { player_id, reply } => {
                let result = turn::roll_dice(&mut self.game, player_id, &mut self.rng)
                    .map(|outcome| self.publish(outcome))
                    .map_err(RoomError::from);
                let _ = reply.send(result);
            }
            RoomCommand::Reroll { player_id, reply } => {
                let result = turn::reroll(&mut self.game, player_id, &mut self.rng)
                    .map(|outcome| self.publish(outcome))
                    .map_err(RoomError::from);
                let _ = reply.send(result);
            }
            RoomCommand::UseAbility { player_id, reply } => {
                let result = turn::use_ability(&mut self.game, player_id, &mut self.rng)
                    .map(|outcome| self.publish(outcome))
                    .map_err(RoomError::from);
                let _ = reply.send(result);
            }
            RoomCommand::BotTurn { player_index } => self.handle_bot_turn(player_index),
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::GetState { reply } => {
                let _ = reply.send(self.game.clone());
            }
            // Handled by the run loop.
            RoomCommand::Shutdown => {}
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room.id.clone(),
            name: self.room.name.clone(),
            host_id: self.room.host_id,
            status: self.game.status,
            player_count: self.game.players.len(),
            max_players: self.room.max_players,
            is_private: self.room.is_private,
            created_at: self.room.created_at,
        }
    }

    fn handle_join(&mut self, player_id: PlayerId, username: String) -> Result<(), RoomError> {
        if self.game.status != GameStatus::Waiting {
            return Err(RoomError::InvalidState("game already started".into()));
        }
        if self.game.players.len() >= self.room.max_players {
            return Err(RoomError::RoomFull(self.room.id.clone()));
        }
        if self.game.players.iter().any(|p| p.id == Some(player_id)) {
            return Err(RoomError::AlreadyInRoom(player_id, self.room.id.clone()));
        }

        self.game.players.push(Player::human(player_id, &*username));
        self.game.add_log(format!("{username} joined the game"));
        tracing::info!(room_id = %self.room.id, %player_id, %username, "player joined");

        self.hub
            .send_to_room(&self.room.id, &GameEvent::player_joined(&username));
        self.broadcast_state();
        Ok(())
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<bool, RoomError> {
        let index = self
            .game
            .players
            .iter()
            .position(|p| p.id == Some(player_id))
            .ok_or(RoomError::Game(GameError::PlayerNotFound(player_id)))?;

        let username = self.game.players[index].username.clone();
        let was_current = self.game.status == GameStatus::InProgress
            && self.game.current_player_index == index;

        self.game.players.remove(index);
        if !self.game.players.is_empty() {
            if self.game.current_player_index > index {
                self.game.current_player_index -= 1;
            }
            self.game.current_player_index %= self.game.players.len();
        } else {
            self.game.current_player_index = 0;
        }
        // The departed player's turn passes to whoever now sits at the
        // same index.
        if was_current && !self.game.players.is_empty() {
            self.game.set_waiting_for_roll(true);
            let next = &mut self.game.players[self.game.current_player_index];
            if let Some(character) = next.character.as_mut() {
                character.reset_for_new_turn();
            }
        }

        // Host hand-off to the first remaining human.
        if self.room.host_id == player_id {
            if let Some(new_host) = self.game.players.iter().find_map(|p| p.id) {
                self.room.host_id = new_host;
                tracing::info!(room_id = %self.room.id, %new_host, "host reassigned");
            }
        }

        self.game.add_log(format!("{username} left the game"));
        tracing::info!(room_id = %self.room.id, %player_id, %username, "player left");

        self.hub
            .send_to_room(&self.room.id, &GameEvent::player_left(&username));
        self.broadcast_state();

        // A pending bot turn is addressed by seat index and this removal
        // may have shifted it. Rebuild the timer whenever a bot holds the
        // turn; schedule_bot aborts any stale one.
        if let Some(bot_index) = self.current_bot() {
            self.schedule_bot(bot_index);
        }

        // A room with no humans (only bots, or nobody) is empty.
        let empty = self.game.players.iter().all(|p| p.is_bot);
        Ok(empty)
    }

    fn handle_add_bot(&mut self) -> Result<String, RoomError> {
        if self.game.status != GameStatus::Waiting {
            return Err(RoomError::InvalidState("game already started".into()));
        }
        if self.game.players.len() >= self.room.max_players {
            return Err(RoomError::RoomFull(self.room.id.clone()));
        }

        let bot_count = self.game.players.iter().filter(|p| p.is_bot).count();
        let name = format!("Bot {}", bot_count + 1);
        self.game.players.push(Player::bot(&*name));
        self.game.add_log(format!("{name} joined the game"));
        tracing::info!(room_id = %self.room.id, %name, "bot added");

        self.hub
            .send_to_room(&self.room.id, &GameEvent::player_joined(&name));
        self.broadcast_state();
        Ok(name)
    }

    fn handle_start(&mut self) -> Result<(), RoomError> {
        let outcome = turn::start(&mut self.game, &mut self.rng)?;
        tracing::info!(room_id = %self.room.id, players = self.game.players.len(), "game started");
        self.publish(outcome);
        Ok(())
    }

    fn handle_end(&mut self) -> Result<(), RoomError> {
        if self.game.status == GameStatus::Finished {
            return Err(RoomError::InvalidState("game already finished".into()));
        }

        self.game.status = GameStatus::Finished;
        self.game.end_time = Some(now_millis());
        let winner = self.game.calculate_final_scores();
        let (winner_id, winner_name) = match winner {
            Some(index) => {
                let player = &self.game.players[index];
                (player.id, player.username.clone())
            }
            None => (None, "nobody".to_string()),
        };
        self.game
            .add_log(format!("Game Over! Winner: {winner_name}"));
        tracing::info!(room_id = %self.room.id, %winner_name, "game ended");

        self.hub.send_to_room(
            &self.room.id,
            &GameEvent::game_over(winner_id, &winner_name),
        );
        self.broadcast_state();
        Ok(())
    }

    fn handle_bot_turn(&mut self, player_index: usize) {
        // State may have shifted since this turn was scheduled (player
        // left, game ended). A stale turn is dropped, never fatal.
        match bot::take_turn(&mut self.game, player_index, &mut self.rng) {
            Ok(outcome) => self.publish(outcome),
            Err(error) => {
                tracing::warn!(
                    room_id = %self.room.id,
                    player_index,
                    %error,
                    "bot turn dropped"
                );
            }
        }
    }

    /// Fans out the events a mutation produced, then a fresh state
    /// snapshot, then schedules the next bot turn if one is due.
    fn publish(&mut self, outcome: TurnOutcome) {
        for event in &outcome.events {
            self.hub.send_to_room(&self.room.id, event);
        }
        self.broadcast_state();
        if let Some(bot_index) = outcome.next_bot {
            self.schedule_bot(bot_index);
        }
    }

    fn broadcast_state(&self) {
        match serde_json::to_value(&self.game) {
            Ok(snapshot) => {
                self.hub
                    .send_to_room(&self.room.id, &GameEvent::game_state(snapshot));
            }
            Err(error) => {
                tracing::error!(room_id = %self.room.id, %error, "failed to serialize state");
            }
        }
    }

    fn current_bot(&self) -> Option<usize> {
        if self.game.status != GameStatus::InProgress {
            return None;
        }
        let index = self.game.current_player_index;
        self.game.players.get(index).filter(|p| p.is_bot).map(|_| index)
    }

    fn schedule_bot(&mut self, player_index: usize) {
        let sender = self.sender.clone();
        let room_id = self.room.id.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(BOT_TURN_DELAY).await;
            // The room may be gone by now; a failed send is fine.
            if sender
                .send(RoomCommand::BotTurn { player_index })
                .await
                .is_err()
            {
                tracing::debug!(%room_id, "bot turn fired after room shutdown");
            }
        });
        // At most one bot turn is ever pending.
        if let Some(previous) = self.bot_task.replace(task) {
            previous.abort();
        }
    }
}

/// Spawns a room actor with the host already seated and returns its
/// handle.
pub(crate) fn spawn_room(
    room: Room,
    host_username: String,
    hub: Arc<BroadcastHub>,
    channel_size: usize,
) -> RoomHandle {
    let (sender, receiver) = mpsc::channel(channel_size);

    let mut game = GameState::new(room.id.clone());
    game.players.push(Player::human(room.host_id, &*host_username));
    game.add_log(format!("{host_username} joined the game"));

    let handle = RoomHandle {
        room_id: room.id.clone(),
        sender: sender.clone(),
    };
    let actor = RoomActor {
        room,
        game,
        rng: StdRng::from_os_rng(),
        hub,
        sender,
        receiver,
        bot_task: None,
    };
    tokio::spawn(actor.run());

    handle
}
