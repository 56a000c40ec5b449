use crate::parser::ParseError;
use const_fnv1a_hash::fnv1a_hash_str_32;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Message trait for type-safe publishing and decoding.
///
/// `NAME` is the fully-qualified logical type name carried on the wire in
/// the `messageType` attribute. Both sides of a topic must agree on it.
pub trait Message:
    serde::Serialize
    + serde::de::DeserializeOwned
    + Clone
    + Send
    + Sync
    + 'static
{
    /// The wire name for this message type, e.g. `"orders.OrderPlaced"`
    const NAME: &'static str;
    /// Compile-time hash of the wire name, used as the registry key
    const HASH: i32 = fnv1a_hash_str_32(Self::NAME) as i32;
}

/// Derives the topic name for a wire type name.
///
/// The same function runs on the publishing and the subscribing side so
/// subscriptions align.
pub fn topic_name(type_name: &str) -> String {
    type_name.replace('.', "_")
}

/// A decoded payload, type-erased until a handler group downcasts it.
pub type AnyPayload = Arc<dyn Any + Send + Sync>;

/// Identity of a registered message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTypeId {
    pub name: &'static str,
    pub hash: i32,
}

/// The unit moved between the wire and the dispatcher.
///
/// Exists from parse until acknowledgement or visibility timeout. The
/// receipt handle is always present, even when parsing failed, so the pump
/// can still delete or dead-letter the message.
pub struct TransportMessage {
    /// Opaque server-side token required for acknowledgement
    pub receipt_handle: String,
    /// Provider-reported approximate delivery count, at least 1
    pub retry_count: u32,
    /// Raw serialized payload after the envelope has been stripped
    pub body: String,
    /// The `messageType` attribute as carried in the envelope
    pub message_type_name: String,
    /// Resolved type identity, absent if resolution failed
    pub message_type: Option<MessageTypeId>,
    /// Decoded payload, absent if parsing failed
    pub message: Option<AnyPayload>,
    pub parsing_succeeded: bool,
    /// Populated when `parsing_succeeded` is false
    pub parse_error: Option<ParseError>,
}

impl fmt::Debug for TransportMessage {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("TransportMessage")
            .field("receipt_handle", &self.receipt_handle)
            .field("retry_count", &self.retry_count)
            .field("message_type_name", &self.message_type_name)
            .field("parsing_succeeded", &self.parsing_succeeded)
            .field("parse_error", &self.parse_error)
            .finish_non_exhaustive()
    }
}
