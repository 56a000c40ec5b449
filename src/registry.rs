use crate::codec::{Codec, CodecError, decode_message};
use crate::models::{AnyPayload, Message, MessageTypeId, topic_name};
use const_fnv1a_hash::fnv1a_hash_str_32;
use std::collections::HashMap;
use std::sync::Arc;

type DecodeFn =
    Arc<dyn Fn(&str, &dyn Codec) -> Result<AnyPayload, CodecError> + Send + Sync>;

/// A registered message type: its identity, its topic, and a decoder that
/// produces the concrete payload from the wire string.
pub struct TypeEntry {
    id: MessageTypeId,
    topic: String,
    decode: DecodeFn,
}

impl TypeEntry {
    pub fn id(&self) -> MessageTypeId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn decode(
        &self,
        raw: &str,
        codec: &dyn Codec,
    ) -> Result<AnyPayload, CodecError> {
        (self.decode)(raw, codec)
    }
}

/// Maps fully-qualified wire type names to concrete decoders.
///
/// Message types travel as names across the wire; the receiving side must
/// register every type it expects to decode. Populated at bus construction
/// and immutable afterwards.
#[derive(Default)]
pub struct TypeRegistry {
    types: HashMap<i32, TypeEntry>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    pub fn register<M: Message>(&mut self) {
        let entry = TypeEntry {
            id: MessageTypeId {
                name: M::NAME,
                hash: M::HASH,
            },
            topic: topic_name(M::NAME),
            decode: Arc::new(|raw, codec| {
                decode_message::<M>(codec, raw)
                    .map(|message| Arc::new(message) as AnyPayload)
            }),
        };

        if let Some(previous) = self.types.insert(M::HASH, entry) {
            assert_eq!(
                previous.id.name,
                M::NAME,
                "hash collision between message types"
            );
        }
    }

    /// Resolves a wire type name to its registry entry.
    ///
    /// The stored name is compared against the looked-up name so a hash
    /// collision can never resolve to the wrong type.
    pub fn resolve(
        &self,
        name: &str,
    ) -> Option<&TypeEntry> {
        let hash = fnv1a_hash_str_32(name) as i32;
        self.types
            .get(&hash)
            .filter(|entry| entry.id.name == name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.resolve(name).is_some()
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.types.values().map(|entry| entry.topic.as_str())
    }
}
