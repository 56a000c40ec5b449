use super::errors::ConfigError;
use super::send_bus::SendBus;
use super::startable::StartableBus;
use crate::codec::{Codec, JsonCodec};
use crate::dispatcher::Dispatcher;
use crate::handler::{
    FaultHandler, HandlerContext, HandlerRegistry, MessageHandler,
    TransportFaultHandler,
};
use crate::logger::{MessageLogger, TracingMessageLogger};
use crate::models::Message;
use crate::parser::MessageParser;
use crate::registry::TypeRegistry;
use crate::transport::{QueueClient, TopicPublisher};
use std::sync::Arc;

/// Everything needed to assemble a bus, with chainable setters.
///
/// Handler registrations also register the message type so the parser
/// can resolve it; publish-only types are declared explicitly.
pub struct BusConfig {
    polling_instances: usize,
    message_retry_count: u32,
    codec: Arc<dyn Codec>,
    queue: Option<Arc<QueueClient>>,
    publisher: Option<Arc<TopicPublisher>>,
    logger: Arc<dyn MessageLogger>,
    types: TypeRegistry,
    handlers: HandlerRegistry,
}

impl BusConfig {
    pub fn new() -> Self {
        Self {
            polling_instances: 1,
            message_retry_count: 5,
            codec: Arc::new(JsonCodec),
            queue: None,
            publisher: None,
            logger: Arc::new(TracingMessageLogger),
            types: TypeRegistry::new(),
            handlers: HandlerRegistry::new(),
        }
    }

    pub fn with_polling_instances(
        mut self,
        count: usize,
    ) -> Self {
        self.polling_instances = count;
        self
    }

    pub fn with_message_retry_count(
        mut self,
        count: u32,
    ) -> Self {
        self.message_retry_count = count;
        self
    }

    pub fn with_codec(
        mut self,
        codec: Arc<dyn Codec>,
    ) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_input_queue(
        mut self,
        queue: Arc<QueueClient>,
    ) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_topic_publisher(
        mut self,
        publisher: Arc<TopicPublisher>,
    ) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_message_logger(
        mut self,
        logger: Arc<dyn MessageLogger>,
    ) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_handler<M, H, F>(
        mut self,
        factory: F,
    ) -> Self
    where
        M: Message,
        H: MessageHandler<M> + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        self.types.register::<M>();
        self.handlers.with_handler(factory);
        self
    }

    pub fn with_fault_handler<M, H, F>(
        mut self,
        factory: F,
    ) -> Self
    where
        M: Message,
        H: FaultHandler<M> + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        self.types.register::<M>();
        self.handlers.with_fault_handler(factory);
        self
    }

    pub fn with_transport_fault_handler<H, F>(
        mut self,
        factory: F,
    ) -> Self
    where
        H: TransportFaultHandler + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        self.handlers.with_transport_fault_handler(factory);
        self
    }

    /// Declares a type this bus publishes but does not handle.
    pub fn with_publishable_type<M: Message>(mut self) -> Self {
        self.types.register::<M>();
        self
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces send-only bus handles for producers that never receive.
pub struct SendBusFactory {
    send_bus: SendBus,
}

impl SendBusFactory {
    pub fn create(&self) -> SendBus {
        self.send_bus.clone()
    }
}

/// Validates a configuration and assembles a receiving bus.
pub fn create_startable_bus(
    config: BusConfig
) -> Result<StartableBus, ConfigError> {
    if config.polling_instances == 0 {
        return Err(ConfigError::NoPollingInstances);
    }
    if config.message_retry_count == 0 {
        return Err(ConfigError::NoRetryBudget);
    }
    if config.handlers.is_empty() {
        return Err(ConfigError::NoHandlers);
    }
    let queue = config.queue.ok_or(ConfigError::MissingInputQueue)?;

    let send_bus = SendBus::new(
        Arc::clone(&config.codec),
        config.publisher,
        Some(Arc::clone(&queue)),
    );
    let registry = Arc::new(config.handlers);
    let parser = Arc::new(MessageParser::new(
        Arc::new(config.types),
        Arc::clone(&config.codec),
    ));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&registry),
        send_bus.clone(),
    ));

    Ok(StartableBus::new(
        config.polling_instances,
        config.message_retry_count,
        queue,
        parser,
        dispatcher,
        config.logger,
        registry,
        send_bus,
    ))
}

/// Validates a configuration and produces a factory of send-only buses.
pub fn create_send_bus_factory(
    config: BusConfig
) -> Result<SendBusFactory, ConfigError> {
    if config.publisher.is_none() && config.queue.is_none() {
        return Err(ConfigError::MissingSendTarget);
    }

    Ok(SendBusFactory {
        send_bus: SendBus::new(config.codec, config.publisher, config.queue),
    })
}
