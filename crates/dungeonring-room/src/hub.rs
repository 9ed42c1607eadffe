//! Broadcast fan-out: room id → subscribed connections.
//!
//! The hub is the only piece of shared mutable state in the room layer.
//! Room actors publish [`GameEvent`]s to it; transport tasks subscribe a
//! connection's outbound byte channel. Delivery is best-effort: a dead
//! connection is dropped and logged, the rest of the room is unaffected.
//! Connections are an ephemeral view — a connection subscribes to at most
//! one room at a time, and the game state itself never lives here.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use dungeonring_protocol::{Codec, ConnectionId, GameEvent, JsonCodec, RoomId};
use tokio::sync::mpsc::UnboundedSender;

/// Outbound byte channel for one connection.
pub type ConnectionSender = UnboundedSender<Vec<u8>>;

#[derive(Default)]
struct HubInner {
    /// Subscribed connections per room.
    rooms: HashMap<RoomId, HashMap<ConnectionId, ConnectionSender>>,
    /// Reverse map: which room each connection watches.
    connections: HashMap<ConnectionId, RoomId>,
}

/// Fans room events out to every subscribed connection.
///
/// Guarded by a plain [`Mutex`]: every operation is a short map touch,
/// and the lock is never held across an await point.
#[derive(Default)]
pub struct BroadcastHub {
    codec: JsonCodec,
    inner: Mutex<HubInner>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, HubInner> {
        // A poisoning panic can't leave the maps half-updated, so the
        // data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Subscribes a connection to a room, moving it out of any room it
    /// was previously watching.
    pub fn subscribe(
        &self,
        room_id: RoomId,
        connection_id: ConnectionId,
        sender: ConnectionSender,
    ) {
        let mut inner = self.inner();
        if let Some(previous) = inner.connections.insert(connection_id, room_id.clone()) {
            if let Some(subscribers) = inner.rooms.get_mut(&previous) {
                subscribers.remove(&connection_id);
                if subscribers.is_empty() {
                    inner.rooms.remove(&previous);
                }
            }
        }
        inner
            .rooms
            .entry(room_id.clone())
            .or_default()
            .insert(connection_id, sender);
        tracing::debug!(%room_id, %connection_id, "connection subscribed");
    }

    /// Removes a closed connection from both maps.
    pub fn connection_closed(&self, connection_id: ConnectionId) {
        let mut inner = self.inner();
        if let Some(room_id) = inner.connections.remove(&connection_id) {
            if let Some(subscribers) = inner.rooms.get_mut(&room_id) {
                subscribers.remove(&connection_id);
                if subscribers.is_empty() {
                    inner.rooms.remove(&room_id);
                }
            }
            tracing::debug!(%room_id, %connection_id, "connection closed");
        }
    }

    /// Drops every subscription for a destroyed room.
    pub fn drop_room(&self, room_id: &RoomId) {
        let mut inner = self.inner();
        if let Some(subscribers) = inner.rooms.remove(room_id) {
            for connection_id in subscribers.keys() {
                inner.connections.remove(connection_id);
            }
        }
    }

    /// Serializes the event once and delivers it to every subscriber.
    ///
    /// Connections whose channel has closed are pruned here; everyone
    /// else still receives the event.
    pub fn send_to_room(&self, room_id: &RoomId, event: &GameEvent) {
        let bytes = match self.codec.encode(event) {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::error!(%room_id, %error, "failed to encode event");
                return;
            }
        };

        let mut inner = self.inner();
        let HubInner { rooms, connections } = &mut *inner;
        let Some(subscribers) = rooms.get_mut(room_id) else {
            return;
        };

        let mut dead = Vec::new();
        for (connection_id, sender) in subscribers.iter() {
            if sender.send(bytes.clone()).is_err() {
                tracing::debug!(%room_id, %connection_id, "dropping dead connection");
                dead.push(*connection_id);
            }
        }
        for connection_id in dead {
            subscribers.remove(&connection_id);
            connections.remove(&connection_id);
        }
        if subscribers.is_empty() {
            rooms.remove(room_id);
        }
    }

    /// Number of connections currently watching a room.
    pub fn subscriber_count(&self, room_id: &RoomId) -> usize {
        self.inner().rooms.get(room_id).map_or(0, HashMap::len)
    }
}
