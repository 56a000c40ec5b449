use crate::dispatcher::DispatchError;
use crate::models::TransportMessage;

/// Message-lifecycle log seam, injected into every pump.
///
/// Implement to ship lifecycle events somewhere other than the process
/// log; the default forwards to `tracing`.
pub trait MessageLogger: Send + Sync {
    fn received(
        &self,
        message: &TransportMessage,
    );

    fn handled(
        &self,
        message: &TransportMessage,
    );

    fn retrying(
        &self,
        message: &TransportMessage,
        error: &DispatchError,
    );

    fn dead_lettered(
        &self,
        message: &TransportMessage,
        error: &DispatchError,
    );
}

/// Default lifecycle logger backed by `tracing`.
pub struct TracingMessageLogger;

impl MessageLogger for TracingMessageLogger {
    fn received(
        &self,
        message: &TransportMessage,
    ) {
        tracing::debug!(
            message_type = %message.message_type_name,
            retry_count = message.retry_count,
            "Received a message"
        );
    }

    fn handled(
        &self,
        message: &TransportMessage,
    ) {
        tracing::info!(
            message_type = %message.message_type_name,
            "Handled a message"
        );
    }

    fn retrying(
        &self,
        message: &TransportMessage,
        error: &DispatchError,
    ) {
        tracing::warn!(
            message_type = %message.message_type_name,
            retry_count = message.retry_count,
            error = %error,
            "Message handling failed; leaving the message for retry"
        );
    }

    fn dead_lettered(
        &self,
        message: &TransportMessage,
        error: &DispatchError,
    ) {
        tracing::error!(
            message_type = %message.message_type_name,
            retry_count = message.retry_count,
            error = %error,
            "Message exhausted its retries; fault handlers invoked"
        );
    }
}
