use super::errors::BusError;
use super::send_bus::SendBus;
use crate::dispatcher::Dispatcher;
use crate::handler::HandlerRegistry;
use crate::logger::MessageLogger;
use crate::models::topic_name;
use crate::parser::MessageParser;
use crate::pump::MessagePump;
use crate::transport::QueueClient;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A fully-assembled receiving bus.
///
/// `start_receiving` subscribes the input queue to the topics of every
/// handled type and spawns the configured number of pumps;
/// `stop_receiving` cancels them and joins every worker.
pub struct StartableBus {
    polling_instances: usize,
    message_retry_count: u32,
    queue: Arc<QueueClient>,
    parser: Arc<MessageParser>,
    dispatcher: Arc<Dispatcher>,
    logger: Arc<dyn MessageLogger>,
    registry: Arc<HandlerRegistry>,
    send_bus: SendBus,
    cancel: CancellationToken,
    workers: Vec<JoinHandle<()>>,
}

impl StartableBus {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        polling_instances: usize,
        message_retry_count: u32,
        queue: Arc<QueueClient>,
        parser: Arc<MessageParser>,
        dispatcher: Arc<Dispatcher>,
        logger: Arc<dyn MessageLogger>,
        registry: Arc<HandlerRegistry>,
        send_bus: SendBus,
    ) -> Self {
        Self {
            polling_instances,
            message_retry_count,
            queue,
            parser,
            dispatcher,
            logger,
            registry,
            send_bus,
            cancel: CancellationToken::new(),
            workers: Vec::new(),
        }
    }

    pub async fn start_receiving(&mut self) -> Result<(), BusError> {
        if !self.workers.is_empty() {
            return Err(BusError::AlreadyStarted);
        }

        let topics: Vec<String> = self
            .registry
            .handled_types()
            .iter()
            .map(|id| topic_name(id.name))
            .collect();
        self.queue
            .subscribe(topics.iter().map(String::as_str))
            .await
            .map_err(BusError::Subscribe)?;

        self.cancel = CancellationToken::new();
        for _ in 0..self.polling_instances {
            let pump = MessagePump::new(
                Arc::clone(&self.queue),
                Arc::clone(&self.parser),
                Arc::clone(&self.dispatcher),
                Arc::clone(&self.logger),
                self.message_retry_count,
                self.cancel.child_token(),
            );
            self.workers.push(pump.start());
        }

        tracing::info!(
            instances = self.polling_instances,
            queue = self.queue.address(),
            "Started receiving"
        );
        Ok(())
    }

    /// Cancels every pump and waits for the workers to finish.
    /// In-flight dispatches run to completion first.
    pub async fn stop_receiving(&mut self) {
        self.cancel.cancel();
        for worker in self.workers.drain(..) {
            if let Err(error) = worker.await {
                tracing::error!(
                    error = %error,
                    "A message pump worker ended abnormally"
                );
            }
        }
        tracing::info!(queue = self.queue.address(), "Stopped receiving");
    }

    pub fn create_send_bus(&self) -> SendBus {
        self.send_bus.clone()
    }
}
