use super::CodecError;
use crate::models::Message;

/// Pluggable codec for the string form of a payload.
///
/// Type direction happens in [`encode_message`] and [`decode_message`],
/// which bridge between concrete message types and the codec through a
/// `serde_json::Value`. Implementations only decide how that value is
/// rendered to and read from the wire string.
pub trait Codec: Send + Sync + 'static {
    fn serialize(
        &self,
        value: &serde_json::Value,
    ) -> Result<String, CodecError>;

    fn deserialize(
        &self,
        raw: &str,
    ) -> Result<serde_json::Value, CodecError>;
}

/// Default codec: compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn serialize(
        &self,
        value: &serde_json::Value,
    ) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::Serialization)
    }

    fn deserialize(
        &self,
        raw: &str,
    ) -> Result<serde_json::Value, CodecError> {
        serde_json::from_str(raw).map_err(CodecError::Deserialization)
    }
}

/// Serializes a message to its wire string through the codec.
pub fn encode_message<M: Message>(
    codec: &dyn Codec,
    message: &M,
) -> Result<String, CodecError> {
    let value =
        serde_json::to_value(message).map_err(CodecError::Serialization)?;
    codec.serialize(&value)
}

/// Decodes a message of a known type from its wire string.
pub fn decode_message<M: Message>(
    codec: &dyn Codec,
    raw: &str,
) -> Result<M, CodecError> {
    let value = codec.deserialize(raw)?;
    serde_json::from_value(value).map_err(CodecError::Deserialization)
}
