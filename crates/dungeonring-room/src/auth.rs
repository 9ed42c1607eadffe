//! Identity hook for validating players before they touch a room.
//!
//! Dungeonring doesn't implement authentication itself — that's the
//! embedding server's job (JWT validation, an auth API, a session store).
//! The room layer only defines the [`IdentityProvider`] trait: one async
//! method that turns a client token into a player identity, called before
//! any join is routed to a room actor.

use dungeonring_protocol::PlayerId;

use crate::RoomError;

/// Validates a client's token and returns their identity.
///
/// `Send + Sync + 'static` because the provider is shared across async
/// tasks for the lifetime of the server.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Validates the given token and returns the player's id and display
    /// name.
    ///
    /// # Errors
    /// Returns [`RoomError::AuthFailed`] when the token is invalid or
    /// expired.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<(PlayerId, String), RoomError>> + Send;
}
