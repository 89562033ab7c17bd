//! Codec trait and implementation for encoding/decoding wire events.
//!
//! A "codec" converts between Rust types and the bytes that travel over a
//! connection. The protocol layer doesn't care how the transport carries
//! those bytes — it just needs something that implements [`Codec`].

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec is shared across connection
/// tasks, each of which may run on any thread in Tokio's pool.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`), matching the
/// "JSON-equivalent textual encoding" the wire contract assumes.
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
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
    use crate::events::{ClientEvent, GameState, ServerEvent, StateSnapshot};
    use crate::ids::RoomCode;

    #[test]
    fn json_codec_round_trips_a_client_event() {
        let codec = JsonCodec;
        let event = ClientEvent::SystemCloseGame {
            room_id: RoomCode::new("ABCD").unwrap(),
        };
        let bytes = codec.encode(&event).unwrap();
        let decoded: ClientEvent = codec.decode(&bytes).unwrap();
        assert!(matches!(decoded, ClientEvent::SystemCloseGame { room_id } if room_id.as_str() == "ABCD"));
    }

    #[test]
    fn json_codec_encodes_server_event_with_type_tag() {
        let codec = JsonCodec;
        let event = ServerEvent::State {
            room_id: RoomCode::new("ABCD").unwrap(),
            state: StateSnapshot {
                game_state: GameState::Paused,
            },
        };
        let bytes = codec.encode(&event).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"type\":\"server:state\""));
    }

    #[test]
    fn json_codec_decode_surfaces_malformed_bytes() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
