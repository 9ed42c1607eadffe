//! Error type for the protocol layer.
//!
//! Each crate defines its own error enum; a `ProtocolError` always means
//! the problem is in serialization or message framing, not in game rules
//! or room management.

/// Errors that can occur while encoding or decoding wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or an
    /// unknown command tag.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
