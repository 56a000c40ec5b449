mod handlers;
mod messages;
mod transports;

pub use handlers::{
    CountingHandler, HandlerState, RecordingFaultHandler,
    RecordingTransportFaultHandler, RepublishingHandler, SharedHandlerState,
};
pub use messages::{OtherMessage, TestMessage};
pub use transports::{InMemoryCloud, PublishRecord};

use crate::codec::{Codec, CodecError, JsonCodec};
use crate::bus::SendBus;
use crate::handler::HandlerContext;
use crate::models::{Message, MessageTypeId, TransportMessage};
use crate::parser::ParseError;
use crate::transport::{QueueClient, TopicPublisher};
use std::sync::Once;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    });
}

/// JSON codec that counts its invocations, proving when serialization
/// actually happens.
#[derive(Default)]
pub struct CountingCodec {
    inner: JsonCodec,
    serializations: AtomicUsize,
    deserializations: AtomicUsize,
}

impl CountingCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serializations(&self) -> usize {
        self.serializations.load(Ordering::SeqCst)
    }

    pub fn deserializations(&self) -> usize {
        self.deserializations.load(Ordering::SeqCst)
    }
}

impl Codec for CountingCodec {
    fn serialize(
        &self,
        value: &serde_json::Value,
    ) -> Result<String, CodecError> {
        self.serializations.fetch_add(1, Ordering::SeqCst);
        self.inner.serialize(value)
    }

    fn deserialize(
        &self,
        raw: &str,
    ) -> Result<serde_json::Value, CodecError> {
        self.deserializations.fetch_add(1, Ordering::SeqCst);
        self.inner.deserialize(raw)
    }
}

/// A send bus wired to an in-memory cloud, with the test message's topic
/// registered.
pub struct BusFixture {
    pub cloud: Arc<InMemoryCloud>,
    pub codec: Arc<CountingCodec>,
    pub bus: SendBus,
}

/// Publisher plus a local input queue: the sender attribute is attached.
pub async fn full_fixture() -> BusFixture {
    init_tracing();
    let cloud = InMemoryCloud::new();
    let codec = Arc::new(CountingCodec::new());

    let publisher = Arc::new(TopicPublisher::new(cloud.topic_transport()));
    publisher
        .register::<TestMessage>()
        .await
        .expect("topic registration succeeds");

    let queue = Arc::new(QueueClient::new(
        cloud.queue_transport("input-queue"),
        cloud.topic_transport(),
    ));

    let bus = SendBus::new(
        Arc::clone(&codec) as Arc<dyn Codec>,
        Some(publisher),
        Some(queue),
    );

    BusFixture { cloud, codec, bus }
}

/// Publisher only: no local queue, so no sender attribute.
pub async fn send_only_no_queue_fixture() -> BusFixture {
    init_tracing();
    let cloud = InMemoryCloud::new();
    let codec = Arc::new(CountingCodec::new());

    let publisher = Arc::new(TopicPublisher::new(cloud.topic_transport()));
    publisher
        .register::<TestMessage>()
        .await
        .expect("topic registration succeeds");

    let bus = SendBus::new(
        Arc::clone(&codec) as Arc<dyn Codec>,
        Some(publisher),
        None,
    );

    BusFixture { cloud, codec, bus }
}

/// A handler context over a bus with no publisher and no queue.
pub fn empty_context() -> HandlerContext {
    HandlerContext::new(SendBus::new(Arc::new(JsonCodec), None, None))
}

/// A transport message in the state the parser leaves it after success.
pub fn parsed_message(message: TestMessage) -> TransportMessage {
    TransportMessage {
        receipt_handle: "receipt-1".to_string(),
        retry_count: 1,
        body: String::new(),
        message_type_name: TestMessage::NAME.to_string(),
        message_type: Some(MessageTypeId {
            name: TestMessage::NAME,
            hash: TestMessage::HASH,
        }),
        message: Some(Arc::new(message)),
        parsing_succeeded: true,
        parse_error: None,
    }
}

/// A transport message in the state the parser leaves it after a type
/// resolution failure.
pub fn unparsed_message(type_name: &str) -> TransportMessage {
    TransportMessage {
        receipt_handle: "receipt-1".to_string(),
        retry_count: 1,
        body: String::new(),
        message_type_name: type_name.to_string(),
        message_type: None,
        message: None,
        parsing_succeeded: false,
        parse_error: Some(ParseError::UnknownType {
            name: type_name.to_string(),
        }),
    }
}
