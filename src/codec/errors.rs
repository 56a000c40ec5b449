#[derive(thiserror::Error, Debug)]
pub enum CodecError {
    #[error("The payload could not be serialized")]
    Serialization(#[source] serde_json::Error),
    #[error("The payload could not be deserialized")]
    Deserialization(#[source] serde_json::Error),
}
