use super::TransportError;
use crate::envelope::MessageAttributes;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

/// A raw message as returned by the queue service, before parsing.
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Token authorizing deletion of this delivery
    pub receipt_handle: String,
    /// The full envelope document
    pub body: String,
    /// Provider receive attributes, e.g. `ApproximateReceiveCount`
    pub attributes: HashMap<String, String>,
}

/// Port to the fan-out topic service.
///
/// Implementations wrap the concrete cloud SDK; the core only needs these
/// three calls. All methods must tolerate concurrent callers.
#[async_trait]
pub trait TopicTransport: Send + Sync {
    /// Creates the topic if missing and returns its id.
    async fn create_topic(
        &self,
        topic_name: &str,
    ) -> Result<String, TransportError>;

    /// Looks up an existing topic id by name.
    async fn find_topic(
        &self,
        topic_name: &str,
    ) -> Result<Option<String>, TransportError>;

    /// Publishes a serialized body plus attributes to a topic.
    async fn publish(
        &self,
        topic_id: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<(), TransportError>;
}

/// Port to the durable queue service.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Stable identifier of the queue, used as the `sender` attribute.
    fn address(&self) -> &str;

    /// Long-polls the queue for a batch of messages.
    ///
    /// Returns an empty batch on cancellation or on an elapsed poll
    /// window rather than raising.
    async fn receive(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReceivedMessage>, TransportError>;

    /// Acknowledges a delivery by receipt handle.
    async fn delete(
        &self,
        receipt_handle: &str,
    ) -> Result<(), TransportError>;

    /// Pushes a locally-built envelope directly onto this queue.
    async fn send(
        &self,
        body: &str,
    ) -> Result<(), TransportError>;

    /// Binds this queue to a topic so published messages fan out here.
    async fn bind_topic(
        &self,
        topic_id: &str,
    ) -> Result<(), TransportError>;
}
