use super::super::pump::MessagePump;
use crate::dispatcher::DispatchError;
use crate::models::TransportMessage;
use crate::transport::ReceivedMessage;

impl MessagePump {
    /// Parses and dispatches one raw queue message, then acknowledges it
    /// according to the retry policy. Never raises.
    pub(crate) async fn process(
        &self,
        raw: ReceivedMessage,
    ) {
        let mut message = self.parser.parse(&raw);
        self.logger.received(&message);

        match message.parse_error.take() {
            None => self.process_parsed(&message).await,
            Some(parse_error) => {
                // Parse failures are terminal: another delivery would
                // fail the same way, so escalate and delete immediately.
                let error = DispatchError::Parse(parse_error);
                self.dispatcher.dispatch_fault(&message, &error).await;
                self.logger.dead_lettered(&message, &error);
                self.delete(&message).await;
            }
        }
    }

    async fn process_parsed(
        &self,
        message: &TransportMessage,
    ) {
        let result = self.dispatcher.dispatch(message).await;

        match result.error {
            None => {
                self.delete(message).await;
                self.logger.handled(message);
            }
            Some(error) if message.retry_count < self.max_retries => {
                // Leave the message; the visibility timeout returns it
                self.logger.retrying(message, &error);
            }
            Some(error) => {
                self.dispatcher.dispatch_fault(message, &error).await;
                self.logger.dead_lettered(message, &error);
                self.delete(message).await;
            }
        }
    }

    async fn delete(
        &self,
        message: &TransportMessage,
    ) {
        if let Err(error) = self.queue.delete(message).await {
            tracing::warn!(
                receipt_handle = %message.receipt_handle,
                error = %error,
                "Failed to delete a message from the input queue"
            );
        }
    }
}
