use crate::handler::HandlerError;
use crate::parser::ParseError;
use crate::transport::PublishError;

/// The error a failed dispatch carries; fault handlers receive it.
#[derive(thiserror::Error, Debug)]
pub enum DispatchError {
    #[error("No handler registered for message type {name}")]
    NoHandler { name: String },

    #[error("Message handling failed")]
    Handler(#[source] HandlerError),

    #[error("The message could not be parsed")]
    Parse(#[source] ParseError),

    #[error("Flushing outbound messages failed")]
    Outbound(#[source] PublishError),
}
