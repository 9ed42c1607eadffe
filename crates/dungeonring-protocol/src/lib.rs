//! Wire protocol for Dungeonring.
//!
//! Everything that travels between the game core and a transport lives
//! here: identity newtypes, the outbound [`GameEvent`] shape, inbound
//! [`ClientCommand`] messages, and the [`Codec`] that turns them into
//! bytes.
//!
//! # Key types
//!
//! - [`PlayerId`], [`RoomId`], [`ConnectionId`] — identity newtypes
//! - [`GameEvent`] / [`EventKind`] — server → client events
//! - [`ClientCommand`] — client → server commands
//! - [`JsonCodec`] — the default JSON codec

mod codec;
mod command;
mod error;
mod event;
mod types;

pub use codec::{Codec, JsonCodec};
pub use command::ClientCommand;
pub use error::ProtocolError;
pub use event::{EventKind, GameEvent};
pub use types::{ConnectionId, PlayerId, RoomId};
