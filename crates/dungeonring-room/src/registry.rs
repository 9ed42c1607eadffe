//! Room registry: creates, tracks, and destroys room actors.
//!
//! The registry is the entry point for room operations from higher
//! layers (the transport accept loop, an HTTP facade). It holds only
//! clonable [`RoomHandle`]s behind a short-lived lock — the lock is
//! taken to copy a handle out and never held across an await.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use dungeonring_engine::GameState;
use dungeonring_protocol::{ClientCommand, PlayerId, RoomId};
use rand::distr::Alphanumeric;
use rand::Rng;

use crate::room::{spawn_room, Room, RoomHandle, RoomInfo};
use crate::{BroadcastHub, RoomError};

/// Length of generated room tokens.
const ROOM_ID_LEN: usize = 8;

/// Rooms hold between two and four seats, humans and bots combined.
const MIN_PLAYERS: usize = 2;
const MAX_PLAYERS: usize = 4;

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Settings for a new room.
#[derive(Debug, Clone)]
pub struct CreateRoom {
    pub name: String,
    pub max_players: usize,
    pub is_private: bool,
    pub bot_count: usize,
}

/// Manages all active rooms.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomId, RoomHandle>>,
    hub: Arc<BroadcastHub>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            hub: Arc::new(BroadcastHub::new()),
        }
    }

    /// The broadcast hub connections subscribe to.
    pub fn hub(&self) -> Arc<BroadcastHub> {
        Arc::clone(&self.hub)
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<RoomId, RoomHandle>> {
        self.rooms.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handle(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms()
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Creates a room with the host seated first and any requested bots
    /// appended after.
    pub async fn create(
        &self,
        settings: CreateRoom,
        host_id: PlayerId,
        host_username: impl Into<String>,
    ) -> Result<RoomId, RoomError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&settings.max_players) {
            return Err(RoomError::InvalidCapacity(settings.max_players));
        }
        // Host takes one seat.
        if settings.bot_count + 1 > settings.max_players {
            return Err(RoomError::InvalidCapacity(settings.bot_count + 1));
        }

        let room_id = generate_room_id();
        let room = Room {
            id: room_id.clone(),
            name: settings.name,
            host_id,
            max_players: settings.max_players,
            is_private: settings.is_private,
            created_at: dungeonring_engine::state::now_millis(),
        };
        let handle = spawn_room(
            room,
            host_username.into(),
            self.hub(),
            DEFAULT_CHANNEL_SIZE,
        );
        for _ in 0..settings.bot_count {
            handle.add_bot().await?;
        }
        self.rooms().insert(room_id.clone(), handle);
        tracing::info!(%room_id, "room created");
        Ok(room_id)
    }

    pub async fn join(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        username: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.handle(room_id)?.join(player_id, username).await
    }

    /// Removes a player; a room left without humans is destroyed.
    pub async fn leave(&self, room_id: &RoomId, player_id: PlayerId) -> Result<(), RoomError> {
        let handle = self.handle(room_id)?;
        let empty = handle.leave(player_id).await?;
        if empty {
            self.destroy(room_id).await?;
            tracing::info!(%room_id, "room destroyed (no humans left)");
        }
        Ok(())
    }

    pub async fn add_bot(&self, room_id: &RoomId) -> Result<String, RoomError> {
        self.handle(room_id)?.add_bot().await
    }

    pub async fn start(&self, room_id: &RoomId) -> Result<(), RoomError> {
        self.handle(room_id)?.start().await
    }

    pub async fn end(&self, room_id: &RoomId) -> Result<(), RoomError> {
        self.handle(room_id)?.end().await
    }

    pub async fn select_character(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        class_id: u8,
        race_id: u8,
    ) -> Result<(), RoomError> {
        self.handle(room_id)?
            .select_character(player_id, class_id, race_id)
            .await
    }

    pub async fn roll(&self, room_id: &RoomId, player_id: PlayerId) -> Result<(), RoomError> {
        self.handle(room_id)?.roll(player_id).await
    }

    pub async fn reroll(&self, room_id: &RoomId, player_id: PlayerId) -> Result<(), RoomError> {
        self.handle(room_id)?.reroll(player_id).await
    }

    pub async fn use_ability(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
    ) -> Result<(), RoomError> {
        self.handle(room_id)?.use_ability(player_id).await
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        self.handle(room_id)?.get_info().await
    }

    pub async fn get_game_state(&self, room_id: &RoomId) -> Result<GameState, RoomError> {
        self.handle(room_id)?.get_state().await
    }

    /// Routes a decoded wire command from an authenticated player to the
    /// room it targets.
    pub async fn dispatch(
        &self,
        player_id: PlayerId,
        username: &str,
        command: ClientCommand,
    ) -> Result<(), RoomError> {
        match command {
            ClientCommand::JoinRoom { room_id } => {
                self.join(&room_id, player_id, username).await
            }
            ClientCommand::LeaveRoom { room_id } => self.leave(&room_id, player_id).await,
            ClientCommand::RollDice { room_id } => self.roll(&room_id, player_id).await,
            ClientCommand::Reroll { room_id } => self.reroll(&room_id, player_id).await,
            ClientCommand::UseAbility { room_id } => self.use_ability(&room_id, player_id).await,
        }
    }

    /// Info for every active room. Rooms that fail to respond (shutting
    /// down) are silently skipped.
    pub async fn list(&self) -> Vec<RoomInfo> {
        let handles: Vec<RoomHandle> = self.rooms().values().cloned().collect();
        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(info) = handle.get_info().await {
                infos.push(info);
            }
        }
        infos
    }

    /// Public rooms that can still be joined.
    pub async fn available(&self) -> Vec<RoomInfo> {
        self.list()
            .await
            .into_iter()
            .filter(|info| !info.is_private && info.is_joinable())
            .collect()
    }

    /// Shuts down a room actor and unsubscribes its connections.
    pub async fn destroy(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms()
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        let _ = handle.shutdown().await;
        self.hub.drop_room(room_id);
        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    pub fn room_count(&self) -> usize {
        self.rooms().len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// An 8-character alphanumeric token. Collisions are accepted as
/// negligible at this scale.
fn generate_room_id() -> RoomId {
    let mut rng = rand::rng();
    let token: String = (0..ROOM_ID_LEN)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect();
    RoomId::new(token)
}
