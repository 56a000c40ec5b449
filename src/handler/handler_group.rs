use super::HandlerError;
use super::message_handler::{
    FaultHandler, HandlerContext, MessageHandler, TransportFaultHandler,
};
use crate::dispatcher::DispatchError;
use crate::models::{AnyPayload, Message, MessageTypeId, TransportMessage};
use futures::future::BoxFuture;
use std::any::Any;
use std::marker::PhantomData;
use tracing::Instrument;

// Type-erased adapter over one registered (message type, handler type)
// pair. A fresh handler is constructed from the factory on every
// invocation, so dispatches share nothing mutable.
trait HandlerAdapter<M: Message>: Send + Sync {
    fn handler_name(&self) -> &'static str;

    fn invoke<'a>(
        &'a self,
        message: M,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

struct FactoryAdapter<M, H, F> {
    factory: F,
    _types: PhantomData<fn() -> (M, H)>,
}

impl<M, H, F> HandlerAdapter<M> for FactoryAdapter<M, H, F>
where
    M: Message,
    H: MessageHandler<M> + 'static,
    F: Fn(&HandlerContext) -> H + Send + Sync,
{
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<H>()
    }

    fn invoke<'a>(
        &'a self,
        message: M,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        // The span is the per-handler logger, keyed on the handler type
        let span = tracing::debug_span!(
            "handle_message",
            handler = self.handler_name(),
            message_type = M::NAME
        );
        Box::pin(
            async move {
                let handler = (self.factory)(ctx);
                handler.handle(message).await
            }
            .instrument(span),
        )
    }
}

trait FaultAdapter<M: Message>: Send + Sync {
    fn handler_name(&self) -> &'static str;

    fn invoke<'a>(
        &'a self,
        message: M,
        error: &'a DispatchError,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

struct FaultFactoryAdapter<M, H, F> {
    factory: F,
    _types: PhantomData<fn() -> (M, H)>,
}

impl<M, H, F> FaultAdapter<M> for FaultFactoryAdapter<M, H, F>
where
    M: Message,
    H: FaultHandler<M> + 'static,
    F: Fn(&HandlerContext) -> H + Send + Sync,
{
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<H>()
    }

    fn invoke<'a>(
        &'a self,
        message: M,
        error: &'a DispatchError,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        let span = tracing::debug_span!(
            "handle_fault",
            handler = self.handler_name(),
            message_type = M::NAME
        );
        Box::pin(
            async move {
                let handler = (self.factory)(ctx);
                handler.handle(message, error).await
            }
            .instrument(span),
        )
    }
}

pub(crate) trait TransportFaultAdapter: Send + Sync {
    fn handler_name(&self) -> &'static str;

    fn invoke<'a>(
        &'a self,
        message: &'a TransportMessage,
        error: &'a DispatchError,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

pub(super) struct TransportFaultFactoryAdapter<H, F> {
    pub(super) factory: F,
    pub(super) _handler: PhantomData<fn() -> H>,
}

impl<H, F> TransportFaultAdapter for TransportFaultFactoryAdapter<H, F>
where
    H: TransportFaultHandler + 'static,
    F: Fn(&HandlerContext) -> H + Send + Sync,
{
    fn handler_name(&self) -> &'static str {
        std::any::type_name::<H>()
    }

    fn invoke<'a>(
        &'a self,
        message: &'a TransportMessage,
        error: &'a DispatchError,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        let span = tracing::debug_span!(
            "handle_transport_fault",
            handler = self.handler_name()
        );
        Box::pin(
            async move {
                let handler = (self.factory)(ctx);
                handler.handle(message, error).await
            }
            .instrument(span),
        )
    }
}

pub(crate) struct Group<M: Message> {
    handlers: Vec<Box<dyn HandlerAdapter<M>>>,
}

impl<M: Message> Group<M> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub(crate) fn register<H, F>(
        &mut self,
        factory: F,
    ) where
        H: MessageHandler<M> + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        self.handlers.push(Box::new(FactoryAdapter {
            factory,
            _types: PhantomData,
        }));
    }
}

pub(crate) trait HandlerGroup: Send + Sync + Any {
    fn message_type(&self) -> MessageTypeId;

    fn handle<'a>(
        &'a self,
        payload: &'a AnyPayload,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>>;
}

impl<M: Message> HandlerGroup for Group<M> {
    fn message_type(&self) -> MessageTypeId {
        MessageTypeId {
            name: M::NAME,
            hash: M::HASH,
        }
    }

    fn handle<'a>(
        &'a self,
        payload: &'a AnyPayload,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            let Some(typed) = payload.downcast_ref::<M>() else {
                return Err(HandlerError::PayloadMismatch(M::NAME));
            };

            // Run every handler even when one fails: retries are
            // whole-message, so partial progress cannot be acknowledged.
            // The last error becomes the result.
            let mut error = None;
            for adapter in &self.handlers {
                if let Err(err) =
                    adapter.invoke(typed.clone(), ctx).await
                {
                    tracing::warn!(
                        handler = adapter.handler_name(),
                        message_type = M::NAME,
                        error = %err,
                        "A handler failed to process the message"
                    );
                    error = Some(err);
                }
            }

            match error {
                None => Ok(()),
                Some(err) => Err(err),
            }
        })
    }
}

pub(crate) struct FaultGroup<M: Message> {
    handlers: Vec<Box<dyn FaultAdapter<M>>>,
}

impl<M: Message> FaultGroup<M> {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub(crate) fn register<H, F>(
        &mut self,
        factory: F,
    ) where
        H: FaultHandler<M> + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        self.handlers.push(Box::new(FaultFactoryAdapter {
            factory,
            _types: PhantomData,
        }));
    }
}

pub(crate) trait FaultHandlerGroup: Send + Sync + Any {
    fn handle_fault<'a>(
        &'a self,
        payload: &'a AnyPayload,
        error: &'a DispatchError,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, ()>;
}

impl<M: Message> FaultHandlerGroup for FaultGroup<M> {
    fn handle_fault<'a>(
        &'a self,
        payload: &'a AnyPayload,
        error: &'a DispatchError,
        ctx: &'a HandlerContext,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            let Some(typed) = payload.downcast_ref::<M>() else {
                tracing::warn!(
                    message_type = M::NAME,
                    "Fault payload does not match its registered type"
                );
                return;
            };

            // Fault handlers are the last chance for custom behavior;
            // their own failures are logged and swallowed.
            for adapter in &self.handlers {
                if let Err(err) =
                    adapter.invoke(typed.clone(), error, ctx).await
                {
                    tracing::warn!(
                        handler = adapter.handler_name(),
                        message_type = M::NAME,
                        error = %err,
                        "A fault handler failed; ignoring"
                    );
                }
            }
        })
    }
}
