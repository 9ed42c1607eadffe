//! Room lifecycle management for Dungeonring.
//!
//! Each room runs as an isolated Tokio task (actor model) owning its own
//! [`dungeonring_engine::GameState`]. All mutations flow through the
//! actor's command channel, so concurrent commands against one room are
//! applied one at a time, in arrival order.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/destroys rooms, routes operations
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`BroadcastHub`] — fans game events out to subscribed connections
//! - [`IdentityProvider`] — the authentication seam embedders implement
//! - [`RoomError`] — everything that can go wrong at this layer

#![allow(async_fn_in_trait)]

mod auth;
mod error;
mod hub;
mod registry;
mod room;

pub use auth::IdentityProvider;
pub use error::RoomError;
pub use hub::{BroadcastHub, ConnectionSender};
pub use registry::{CreateRoom, RoomRegistry};
pub use room::{Room, RoomHandle, RoomInfo};
