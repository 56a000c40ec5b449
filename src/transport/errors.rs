use crate::codec::CodecError;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Connection to the messaging service failed: {0}")]
    Connection(String),
    #[error("The messaging service rejected the request: {0}")]
    Rejected(String),
    #[error("The request to the messaging service timed out")]
    Timeout,
}

#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    #[error("No topic {topic} exists for message type {name}")]
    UnknownTopic { name: String, topic: String },

    #[error("The payload for message type {name} could not be serialized")]
    Serialization {
        name: String,
        #[source]
        source: CodecError,
    },

    #[error("The envelope for message type {name} could not be serialized")]
    Envelope {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No topic publisher is configured on this bus")]
    MissingPublisher,

    #[error("No local input queue is configured on this bus")]
    MissingQueue,

    #[error("The messaging service rejected the send for type {name}")]
    Transport {
        name: String,
        #[source]
        source: TransportError,
    },
}
