use super::DispatchError;
use crate::bus::{SendBus, TransactionContext};
use crate::handler::{HandlerContext, HandlerRegistry};
use crate::models::TransportMessage;
use std::sync::Arc;

/// Outcome of processing one transport message.
#[derive(Debug)]
pub struct MessageProcessingResult {
    pub error: Option<DispatchError>,
}

impl MessageProcessingResult {
    pub fn success() -> Self {
        Self { error: None }
    }

    pub fn failed(error: DispatchError) -> Self {
        Self { error: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs one parsed message through its handler set under a transaction
/// context, and escalates exhausted or unparseable messages to fault
/// handlers.
pub struct Dispatcher {
    registry: Arc<HandlerRegistry>,
    bus: SendBus,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<HandlerRegistry>,
        bus: SendBus,
    ) -> Self {
        Self { registry, bus }
    }

    #[tracing::instrument(
        skip(self, message),
        fields(
            message_type = %message.message_type_name,
            retry_count = message.retry_count
        )
    )]
    pub async fn dispatch(
        &self,
        message: &TransportMessage,
    ) -> MessageProcessingResult {
        let (type_id, payload) =
            match (&message.message_type, &message.message) {
                (Some(type_id), Some(payload)) => (*type_id, payload),
                _ => {
                    return MessageProcessingResult::failed(
                        DispatchError::NoHandler {
                            name: message.message_type_name.clone(),
                        },
                    );
                }
            };

        let Some(group) = self.registry.handlers_for(type_id.hash) else {
            return MessageProcessingResult::failed(
                DispatchError::NoHandler {
                    name: message.message_type_name.clone(),
                },
            );
        };

        let transaction = TransactionContext::new();
        let ctx =
            HandlerContext::new(self.bus.with_transaction(&transaction));

        let mut error = group
            .handle(payload, &ctx)
            .await
            .err()
            .map(DispatchError::Handler);

        // The context commits even when a handler failed: retries are
        // whole-message, and outbound sends from the handlers that did
        // succeed flush with the dispatch.
        if let Err(flush_error) = transaction.commit(&self.bus).await {
            tracing::warn!(
                error = %flush_error,
                "Failed to flush outbound messages after dispatch"
            );
            if error.is_none() {
                error = Some(DispatchError::Outbound(flush_error));
            }
        }

        MessageProcessingResult { error }
    }

    /// Invokes every transport-level fault handler, then the typed fault
    /// handlers when a decoded payload exists.
    #[tracing::instrument(
        skip(self, message, error),
        fields(message_type = %message.message_type_name)
    )]
    pub async fn dispatch_fault(
        &self,
        message: &TransportMessage,
        error: &DispatchError,
    ) {
        let transaction = TransactionContext::new();
        let ctx =
            HandlerContext::new(self.bus.with_transaction(&transaction));

        for adapter in self.registry.transport_fault_handlers() {
            if let Err(fault_error) =
                adapter.invoke(message, error, &ctx).await
            {
                tracing::warn!(
                    handler = adapter.handler_name(),
                    error = %fault_error,
                    "A fault handler failed; ignoring"
                );
            }
        }

        if message.parsing_succeeded {
            if let (Some(type_id), Some(payload)) =
                (&message.message_type, &message.message)
            {
                if let Some(group) =
                    self.registry.fault_handlers_for(type_id.hash)
                {
                    group.handle_fault(payload, error, &ctx).await;
                }
            }
        }

        if let Err(flush_error) = transaction.commit(&self.bus).await {
            tracing::warn!(
                error = %flush_error,
                "Failed to flush outbound messages after fault dispatch"
            );
        }
    }
}
