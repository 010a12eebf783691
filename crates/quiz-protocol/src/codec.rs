use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ProtocolError;

/// Wire encode/decode, abstracted so `quiz-transport` can swap formats
/// without the rest of the system noticing.
pub trait Codec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ProtocolError>;
}

#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientCommand, RoomCode};

    #[test]
    fn test_json_codec_round_trips_client_command() {
        let codec = JsonCodec;
        let cmd = ClientCommand::LeaveRoom {
            code: RoomCode::normalize("abcd"),
            player_id: crate::PlayerId(uuid::Uuid::nil()),
        };
        let bytes = codec.encode(&cmd).unwrap();
        let back: ClientCommand = codec.decode(&bytes).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn test_json_codec_decode_garbage_is_error() {
        let codec = JsonCodec;
        let result: Result<ClientCommand, _> = codec.decode(b"{not json");
        assert!(result.is_err());
    }
}
