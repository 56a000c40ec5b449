use super::transaction::{OutboundMode, PendingOutbound, TransactionContext};
use crate::codec::{Codec, encode_message};
use crate::envelope::{
    ATTR_MESSAGE_TYPE, ATTR_SENDER, Envelope, MessageAttributes,
};
use crate::models::Message;
use crate::transport::{PublishError, QueueClient, TopicPublisher};
use std::ops::Deref;
use std::sync::Arc;

struct BusInner {
    codec: Arc<dyn Codec>,
    publisher: Option<Arc<TopicPublisher>>,
    queue: Option<Arc<QueueClient>>,
}

/// Client-facing publish API.
///
/// `publish` emits to the topic derived from the message type;
/// `publish_local` enqueues directly on the owning queue. With an active
/// transaction context attached, both buffer until commit; otherwise they
/// serialize and send immediately. Cheap to clone.
#[derive(Clone)]
pub struct SendBus {
    inner: Arc<BusInner>,
    transaction: Option<TransactionContext>,
}

impl SendBus {
    pub(crate) fn new(
        codec: Arc<dyn Codec>,
        publisher: Option<Arc<TopicPublisher>>,
        queue: Option<Arc<QueueClient>>,
    ) -> Self {
        Self {
            inner: Arc::new(BusInner {
                codec,
                publisher,
                queue,
            }),
            transaction: None,
        }
    }

    /// A clone of this bus whose sends enlist on the given context.
    pub(crate) fn with_transaction(
        &self,
        transaction: &TransactionContext,
    ) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            transaction: Some(transaction.clone()),
        }
    }

    /// Opens an explicit transaction scope over this bus.
    pub fn transaction(&self) -> BusTransaction {
        let context = TransactionContext::new();
        BusTransaction {
            bus: self.with_transaction(&context),
            context,
        }
    }

    /// Publishes a message to its topic.
    pub async fn publish<M: Message>(
        &self,
        message: M,
    ) -> Result<(), PublishError> {
        self.publish_with(move || message).await
    }

    /// Publishes a message built lazily; inside a transaction the builder
    /// only runs at commit.
    pub async fn publish_with<M, F>(
        &self,
        build: F,
    ) -> Result<(), PublishError>
    where
        M: Message,
        F: FnOnce() -> M + Send + 'static,
    {
        self.dispatch_outbound(PendingOutbound {
            mode: OutboundMode::Publish,
            type_name: M::NAME,
            build: Box::new(move |codec| encode_message(codec, &build())),
        })
        .await
    }

    /// Publishes a batch of messages one by one, preserving order.
    pub async fn publish_many<M: Message>(
        &self,
        messages: Vec<M>,
    ) -> Result<(), PublishError> {
        for message in messages {
            self.publish(message).await?;
        }
        Ok(())
    }

    /// Enqueues a message directly on the owning queue, bypassing the
    /// topic.
    pub async fn publish_local<M: Message>(
        &self,
        message: M,
    ) -> Result<(), PublishError> {
        self.publish_local_with(move || message).await
    }

    pub async fn publish_local_with<M, F>(
        &self,
        build: F,
    ) -> Result<(), PublishError>
    where
        M: Message,
        F: FnOnce() -> M + Send + 'static,
    {
        self.dispatch_outbound(PendingOutbound {
            mode: OutboundMode::SendLocal,
            type_name: M::NAME,
            build: Box::new(move |codec| encode_message(codec, &build())),
        })
        .await
    }

    async fn dispatch_outbound(
        &self,
        entry: PendingOutbound,
    ) -> Result<(), PublishError> {
        let entry = match &self.transaction {
            Some(transaction) => match transaction.enlist(entry) {
                Ok(()) => return Ok(()),
                // The scope already completed; send immediately
                Err(entry) => entry,
            },
            None => entry,
        };
        self.flush(entry).await
    }

    /// Builds, serializes, and sends one outbound entry.
    pub(crate) async fn flush(
        &self,
        entry: PendingOutbound,
    ) -> Result<(), PublishError> {
        let body = (entry.build)(self.inner.codec.as_ref()).map_err(
            |source| PublishError::Serialization {
                name: entry.type_name.to_string(),
                source,
            },
        )?;

        match entry.mode {
            OutboundMode::Publish => {
                self.publish_now(entry.type_name, &body).await
            }
            OutboundMode::SendLocal => {
                self.send_local_now(entry.type_name, body).await
            }
        }
    }

    #[tracing::instrument(
        skip(self, body),
        fields(message_type = type_name),
        err
    )]
    async fn publish_now(
        &self,
        type_name: &'static str,
        body: &str,
    ) -> Result<(), PublishError> {
        let publisher = self
            .inner
            .publisher
            .as_deref()
            .ok_or(PublishError::MissingPublisher)?;

        // The sender attribute is attached only when this bus owns a
        // local queue; consumers must treat it as optional.
        let mut attributes = MessageAttributes::new();
        if let Some(queue) = &self.inner.queue {
            attributes
                .insert(ATTR_SENDER.to_string(), queue.address().to_string());
        }

        publisher.publish(body, type_name, attributes).await
    }

    #[tracing::instrument(
        skip(self, body),
        fields(message_type = type_name),
        err
    )]
    async fn send_local_now(
        &self,
        type_name: &'static str,
        body: String,
    ) -> Result<(), PublishError> {
        let queue = self
            .inner
            .queue
            .as_deref()
            .ok_or(PublishError::MissingQueue)?;

        let mut attributes = MessageAttributes::new();
        attributes
            .insert(ATTR_MESSAGE_TYPE.to_string(), type_name.to_string());
        attributes
            .insert(ATTR_SENDER.to_string(), queue.address().to_string());

        let envelope = Envelope::wrap(body, attributes);
        let raw = serde_json::to_string(&envelope).map_err(|source| {
            PublishError::Envelope {
                name: type_name.to_string(),
                source,
            }
        })?;

        queue.enqueue(&raw).await.map_err(|source| {
            PublishError::Transport {
                name: type_name.to_string(),
                source,
            }
        })
    }
}

/// An open transaction scope; publishes made through it buffer until
/// `commit` and vanish on `rollback` (or on drop).
pub struct BusTransaction {
    bus: SendBus,
    context: TransactionContext,
}

impl BusTransaction {
    pub async fn commit(self) -> Result<(), PublishError> {
        self.context.commit(&self.bus).await
    }

    pub fn rollback(self) {
        self.context.discard();
    }
}

impl Deref for BusTransaction {
    type Target = SendBus;

    fn deref(&self) -> &SendBus {
        &self.bus
    }
}
