use crate::transport::TransportError;

/// Raised while validating a bus configuration; never reaches a pump.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("A receiving bus requires an input queue")]
    MissingInputQueue,

    #[error("A send bus requires a topic publisher or a local queue")]
    MissingSendTarget,

    #[error("The number of polling instances must be at least 1")]
    NoPollingInstances,

    #[error("The message retry count must be at least 1")]
    NoRetryBudget,

    #[error("A receiving bus requires at least one registered handler")]
    NoHandlers,
}

#[derive(thiserror::Error, Debug)]
pub enum BusError {
    #[error("The bus is already receiving")]
    AlreadyStarted,

    #[error("Subscribing the input queue to its topics failed")]
    Subscribe(#[source] TransportError),
}
