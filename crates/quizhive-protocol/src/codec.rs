//! Codec trait and implementations for serializing messages.
//!
//! The rest of the server doesn't care how messages become bytes — it
//! talks to anything implementing [`Codec`]. [`JsonCodec`] is the
//! default (human-readable, inspectable in browser devtools); a binary
//! codec can be dropped in later without touching other layers.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts message types to and from raw bytes.
///
/// `Send + Sync + 'static` so a codec can be shared across connection
/// tasks for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientRequest, RoomId};

    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let req = ClientRequest::PlayAgain {
            room_id: RoomId::new("abc"),
        };

        let bytes = codec.encode(&req).unwrap();
        let decoded: ClientRequest = codec.decode(&bytes).unwrap();

        assert_eq!(req, decoded);
    }

    #[test]
    fn test_json_codec_decode_rejects_garbage() {
        let codec = JsonCodec;
        let result: Result<ClientRequest, _> = codec.decode(b"\x00\x01");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
