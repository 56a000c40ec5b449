use super::{QueueTransport, ReceivedMessage, TopicTransport, TransportError};
use crate::models::TransportMessage;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The consumer's handle on its input queue.
///
/// Owns the queue port plus a topic port so the queue can be bound to the
/// topics of the message types it handles.
pub struct QueueClient {
    queue: Arc<dyn QueueTransport>,
    topics: Arc<dyn TopicTransport>,
}

impl QueueClient {
    pub fn new(
        queue: Arc<dyn QueueTransport>,
        topics: Arc<dyn TopicTransport>,
    ) -> Self {
        Self { queue, topics }
    }

    /// Stable identifier of this queue, used as the `sender` attribute.
    pub fn address(&self) -> &str {
        self.queue.address()
    }

    /// Long-polls the queue; empty on cancellation or timeout.
    pub async fn receive(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReceivedMessage>, TransportError> {
        self.queue.receive(cancel).await
    }

    /// Acknowledges a message by its receipt handle.
    pub async fn delete(
        &self,
        message: &TransportMessage,
    ) -> Result<(), TransportError> {
        self.queue.delete(&message.receipt_handle).await
    }

    /// Pushes a locally-built envelope directly onto this queue.
    pub async fn enqueue(
        &self,
        body: &str,
    ) -> Result<(), TransportError> {
        self.queue.send(body).await
    }

    /// Binds this queue to the topic for each given topic name,
    /// creating topics that do not exist yet.
    pub async fn subscribe<'a, I>(
        &self,
        topic_names: I,
    ) -> Result<(), TransportError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for topic in topic_names {
            let id = match self.topics.find_topic(topic).await? {
                Some(id) => id,
                None => self.topics.create_topic(topic).await?,
            };
            self.queue.bind_topic(&id).await?;
            tracing::debug!(
                topic,
                queue = self.queue.address(),
                "Bound the input queue to a topic"
            );
        }
        Ok(())
    }
}
