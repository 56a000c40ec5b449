use crate::envelope::{Envelope, MessageAttributes};
use crate::transport::{
    QueueTransport, ReceivedMessage, TopicTransport, TransportError,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// One publish request as it reached the fake topic service.
#[derive(Debug, Clone)]
pub struct PublishRecord {
    pub topic_id: String,
    pub body: String,
    pub attributes: MessageAttributes,
}

#[derive(Debug, Clone)]
struct QueueItem {
    receipt: String,
    body: String,
    receive_count: u32,
}

struct QueueState {
    address: String,
    items: Mutex<VecDeque<QueueItem>>,
    in_flight: Mutex<Vec<QueueItem>>,
    deleted: Mutex<Vec<String>>,
    notify: Notify,
    next_receipt: AtomicU64,
}

impl QueueState {
    fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            items: Mutex::new(VecDeque::new()),
            in_flight: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            notify: Notify::new(),
            next_receipt: AtomicU64::new(1),
        }
    }

    fn push(
        &self,
        body: &str,
    ) {
        let n = self.next_receipt.fetch_add(1, Ordering::SeqCst);
        self.items
            .lock()
            .expect("queue lock")
            .push_back(QueueItem {
                receipt: format!("{}-{}", self.address, n),
                body: body.to_string(),
                receive_count: 0,
            });
        self.notify.notify_one();
    }

    // Undeleted deliveries reappear on the next receive, as if their
    // visibility timeout had already elapsed.
    fn requeue_in_flight(&self) {
        let mut in_flight = self.in_flight.lock().expect("queue lock");
        let mut items = self.items.lock().expect("queue lock");
        for item in in_flight.drain(..).rev() {
            items.push_front(item);
        }
    }

    fn try_receive(&self) -> Option<ReceivedMessage> {
        self.requeue_in_flight();
        // One lock at a time; only requeue_in_flight holds both
        let mut item = {
            let mut items = self.items.lock().expect("queue lock");
            items.pop_front()?
        };
        item.receive_count += 1;

        let mut attributes = HashMap::new();
        attributes.insert(
            crate::envelope::RECEIVE_COUNT_ATTRIBUTE.to_string(),
            item.receive_count.to_string(),
        );
        let received = ReceivedMessage {
            receipt_handle: item.receipt.clone(),
            body: item.body.clone(),
            attributes,
        };

        self.in_flight.lock().expect("queue lock").push(item);
        Some(received)
    }
}

/// A fake provider: topics, subscriptions, and queues in memory.
///
/// Publishes wrap the body in the provider envelope and fan out to every
/// bound queue, so the full receive pipeline can run against it.
pub struct InMemoryCloud {
    topics: Mutex<HashMap<String, String>>,
    subscriptions: Mutex<HashMap<String, Vec<Arc<QueueState>>>>,
    published: Mutex<Vec<PublishRecord>>,
    queues: Mutex<HashMap<String, Arc<QueueState>>>,
}

impl InMemoryCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            topics: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            published: Mutex::new(Vec::new()),
            queues: Mutex::new(HashMap::new()),
        })
    }

    pub fn topic_transport(self: &Arc<Self>) -> Arc<dyn TopicTransport> {
        Arc::new(InMemoryTopicTransport {
            cloud: Arc::clone(self),
        })
    }

    pub fn queue_transport(
        self: &Arc<Self>,
        address: &str,
    ) -> Arc<dyn QueueTransport> {
        Arc::new(InMemoryQueueTransport {
            cloud: Arc::clone(self),
            state: self.queue_state(address),
        })
    }

    pub fn create_topic(
        &self,
        name: &str,
    ) -> String {
        let mut topics = self.topics.lock().expect("cloud lock");
        topics
            .entry(name.to_string())
            .or_insert_with(|| format!("topic:{name}"))
            .clone()
    }

    pub fn topic_id(
        &self,
        name: &str,
    ) -> Option<String> {
        self.topics.lock().expect("cloud lock").get(name).cloned()
    }

    pub fn published(&self) -> Vec<PublishRecord> {
        self.published.lock().expect("cloud lock").clone()
    }

    pub fn queued_bodies(
        &self,
        address: &str,
    ) -> Vec<String> {
        let state = self.queue_state(address);
        let mut bodies: Vec<String> = state
            .in_flight
            .lock()
            .expect("queue lock")
            .iter()
            .map(|item| item.body.clone())
            .collect();
        bodies.extend(
            state
                .items
                .lock()
                .expect("queue lock")
                .iter()
                .map(|item| item.body.clone()),
        );
        bodies
    }

    pub fn deleted(
        &self,
        address: &str,
    ) -> Vec<String> {
        self.queue_state(address)
            .deleted
            .lock()
            .expect("queue lock")
            .clone()
    }

    fn queue_state(
        &self,
        address: &str,
    ) -> Arc<QueueState> {
        let mut queues = self.queues.lock().expect("cloud lock");
        Arc::clone(
            queues
                .entry(address.to_string())
                .or_insert_with(|| Arc::new(QueueState::new(address))),
        )
    }
}

struct InMemoryTopicTransport {
    cloud: Arc<InMemoryCloud>,
}

#[async_trait]
impl TopicTransport for InMemoryTopicTransport {
    async fn create_topic(
        &self,
        topic_name: &str,
    ) -> Result<String, TransportError> {
        Ok(self.cloud.create_topic(topic_name))
    }

    async fn find_topic(
        &self,
        topic_name: &str,
    ) -> Result<Option<String>, TransportError> {
        Ok(self.cloud.topic_id(topic_name))
    }

    async fn publish(
        &self,
        topic_id: &str,
        body: &str,
        attributes: &MessageAttributes,
    ) -> Result<(), TransportError> {
        self.cloud
            .published
            .lock()
            .expect("cloud lock")
            .push(PublishRecord {
                topic_id: topic_id.to_string(),
                body: body.to_string(),
                attributes: attributes.clone(),
            });

        // Fan out to bound queues the way the provider would: wrap the
        // body in the envelope and deliver a copy to each queue.
        let envelope =
            Envelope::wrap(body.to_string(), attributes.clone());
        let raw = serde_json::to_string(&envelope).map_err(|error| {
            TransportError::Rejected(error.to_string())
        })?;

        let subscribers = self
            .cloud
            .subscriptions
            .lock()
            .expect("cloud lock")
            .get(topic_id)
            .cloned()
            .unwrap_or_default();
        for queue in subscribers {
            queue.push(&raw);
        }
        Ok(())
    }
}

struct InMemoryQueueTransport {
    cloud: Arc<InMemoryCloud>,
    state: Arc<QueueState>,
}

#[async_trait]
impl QueueTransport for InMemoryQueueTransport {
    fn address(&self) -> &str {
        &self.state.address
    }

    async fn receive(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReceivedMessage>, TransportError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(Vec::new());
            }
            if let Some(received) = self.state.try_receive() {
                return Ok(vec![received]);
            }
            tokio::select! {
                _ = cancel.cancelled() => return Ok(Vec::new()),
                _ = self.state.notify.notified() => {}
                _ = tokio::time::sleep(Duration::from_millis(20)) => {}
            }
        }
    }

    async fn delete(
        &self,
        receipt_handle: &str,
    ) -> Result<(), TransportError> {
        self.state
            .in_flight
            .lock()
            .expect("queue lock")
            .retain(|item| item.receipt != receipt_handle);
        self.state
            .deleted
            .lock()
            .expect("queue lock")
            .push(receipt_handle.to_string());
        Ok(())
    }

    async fn send(
        &self,
        body: &str,
    ) -> Result<(), TransportError> {
        self.state.push(body);
        Ok(())
    }

    async fn bind_topic(
        &self,
        topic_id: &str,
    ) -> Result<(), TransportError> {
        self.cloud
            .subscriptions
            .lock()
            .expect("cloud lock")
            .entry(topic_id.to_string())
            .or_default()
            .push(Arc::clone(&self.state));
        Ok(())
    }
}
