//! A lightweight pub/sub message bus over a cloud fan-out topic service
//! and a durable at-least-once queue service.
//!
//! Producers publish typed messages to topics derived from the message
//! type name; consumers own an input queue subscribed to one or more
//! topics, poll it concurrently, decode payloads, dispatch them to
//! registered handlers, and retry or dead-letter on failure. Outbound
//! sends can ride an explicit transaction scope: buffered until commit,
//! discarded on rollback.
//!
//! # Quick Start
//!
//! ```ignore
//! use fanout_bus::*;
//!
//! // 1. Define your message
//! #[derive(Serialize, Deserialize, Clone)]
//! struct OrderPlaced { order_id: u64 }
//!
//! impl Message for OrderPlaced {
//!     const NAME: &'static str = "orders.OrderPlaced";
//! }
//!
//! // 2. Create a handler
//! struct OrderHandler;
//! impl MessageHandler<OrderPlaced> for OrderHandler {
//!     // ... handle implementation
//! }
//!
//! // 3. Assemble the bus over your cloud transports
//! let queue = Arc::new(QueueClient::new(queue_transport, topic_transport));
//! let config = BusConfig::new()
//!     .with_input_queue(queue)
//!     .with_polling_instances(4)
//!     .with_message_retry_count(3)
//!     .with_handler(|_ctx| OrderHandler);
//!
//! // 4. Start receiving
//! let mut bus = create_startable_bus(config)?;
//! bus.start_receiving().await?;
//!
//! // 5. Publish
//! let send_bus = bus.create_send_bus();
//! send_bus.publish(OrderPlaced { order_id: 123 }).await?;
//! ```

mod bus;
mod codec;
mod dispatcher;
mod envelope;
mod handler;
mod logger;
mod models;
mod parser;
mod pump;
mod registry;
mod transport;

#[cfg(test)]
mod test_utils;

pub use bus::{
    BusConfig, BusError, BusTransaction, ConfigError, SendBus,
    SendBusFactory, StartableBus, TransactionContext,
    create_send_bus_factory, create_startable_bus,
};
pub use codec::{Codec, CodecError, JsonCodec, decode_message, encode_message};
pub use dispatcher::{DispatchError, Dispatcher, MessageProcessingResult};
pub use envelope::{
    ATTR_FROM_TOPIC, ATTR_MESSAGE_TYPE, ATTR_SENDER, Envelope,
    EnvelopeAttribute, MessageAttributes, RECEIVE_COUNT_ATTRIBUTE,
};
pub use handler::{
    FaultHandler, HandlerContext, HandlerError, HandlerRegistry,
    MessageHandler, TransportFaultHandler,
};
pub use logger::{MessageLogger, TracingMessageLogger};
pub use models::{
    AnyPayload, Message, MessageTypeId, TransportMessage, topic_name,
};
pub use parser::{MessageParser, ParseError};
pub use pump::MessagePump;
pub use registry::{TypeEntry, TypeRegistry};
pub use transport::{
    PublishError, QueueClient, QueueTransport, ReceivedMessage,
    TopicPublisher, TopicTransport, TransportError,
};
