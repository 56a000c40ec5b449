use crate::dispatcher::Dispatcher;
use crate::logger::MessageLogger;
use crate::parser::MessageParser;
use crate::transport::QueueClient;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One polling worker over the input queue.
///
/// Fetches a batch, dispatches each message, and acknowledges according
/// to the retry policy: success deletes; failure below the retry ceiling
/// leaves the message for the visibility timeout; failure at the ceiling
/// and parse failures escalate to fault handlers and delete.
///
/// The loop never propagates an error; transient receive failures are
/// logged and retried with backoff. `stop` cancels promptly while
/// in-flight dispatches run to completion.
pub struct MessagePump {
    pub(super) queue: Arc<QueueClient>,
    pub(super) parser: Arc<MessageParser>,
    pub(super) dispatcher: Arc<Dispatcher>,
    pub(super) logger: Arc<dyn MessageLogger>,
    pub(super) max_retries: u32,
    pub(super) cancel: CancellationToken,
}

impl MessagePump {
    pub fn new(
        queue: Arc<QueueClient>,
        parser: Arc<MessageParser>,
        dispatcher: Arc<Dispatcher>,
        logger: Arc<dyn MessageLogger>,
        max_retries: u32,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            queue,
            parser,
            dispatcher,
            logger,
            max_retries,
            cancel,
        }
    }

    /// Spawns the polling loop; the handle joins when the pump stops.
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Signals the pump to stop and returns promptly; await the handle
    /// returned by `start` for completion.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}
