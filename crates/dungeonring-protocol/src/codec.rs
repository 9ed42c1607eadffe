//! Codec trait and the default JSON implementation.
//!
//! The broadcast layer doesn't care how messages are serialized — it just
//! needs something implementing [`Codec`]. A binary codec could be slotted
//! in later without touching any other code.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts between Rust types and raw bytes.
///
/// `Send + Sync + 'static` because codecs are held by long-lived async
/// tasks that may run on any worker thread. The methods are generic over
/// the message type; `DeserializeOwned` (vs plain `Deserialize`) means
/// decoded values own their data, so the input buffer can be dropped.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// JSON is the native format here — the event shape itself carries
/// `serde_json::Value` snapshots — and it keeps messages inspectable in
/// browser DevTools.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameEvent;

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let event = GameEvent::dice_rolled(6);
        let bytes = codec.encode(&event).unwrap();
        let decoded: GameEvent = codec.decode(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_decode_garbage_is_an_error() {
        let codec = JsonCodec;
        let result: Result<GameEvent, _> = codec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape_is_an_error() {
        let codec = JsonCodec;
        // Valid JSON, but missing the required "type" tag.
        let result: Result<GameEvent, _> = codec.decode(b"{\"data\": 4}");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
