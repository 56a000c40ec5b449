use super::HandlerError;
use crate::bus::SendBus;
use crate::dispatcher::DispatchError;
use crate::models::{Message, TransportMessage};
use futures::future::BoxFuture;

/// Per-dispatch bundle injected into handler factories.
///
/// Carries the transaction-bound send bus: outbound messages published
/// through it flush atomically with the dispatch.
#[derive(Clone)]
pub struct HandlerContext {
    pub bus: SendBus,
}

impl HandlerContext {
    pub fn new(bus: SendBus) -> Self {
        Self { bus }
    }
}

/// The single method every message handler implements.
pub trait MessageHandler<M: Message>: Send + Sync {
    fn handle<'a>(
        &'a self,
        message: M,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

/// Invoked with the decoded payload once a message has exhausted its
/// retries.
pub trait FaultHandler<M: Message>: Send + Sync {
    fn handle<'a>(
        &'a self,
        message: M,
        error: &'a DispatchError,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

/// Invoked with the raw transport message for failures that happen before
/// or without a decoded payload, such as parse failures.
pub trait TransportFaultHandler: Send + Sync {
    fn handle<'a>(
        &'a self,
        message: &'a TransportMessage,
        error: &'a DispatchError,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}
