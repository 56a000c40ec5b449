#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("The handler rejected the message: {0}")]
    Rejected(String),

    #[error("The decoded payload does not match message type {0}")]
    PayloadMismatch(&'static str),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}
