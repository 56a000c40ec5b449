use crate::codec::CodecError;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("The message envelope could not be deserialized")]
    Envelope(#[source] serde_json::Error),

    #[error("The message envelope carries no messageType attribute")]
    MissingTypeAttribute,

    #[error("Unable to find message type {name}")]
    UnknownType { name: String },

    #[error("The payload for message type {name} could not be decoded")]
    Payload {
        name: String,
        #[source]
        source: CodecError,
    },
}
