use super::super::backoff::ReceiveBackoff;
use super::super::pump::MessagePump;
use std::time::Duration;

impl MessagePump {
    /// Runs the polling loop until cancelled.
    #[tracing::instrument(
        skip(self),
        fields(
            queue = self.queue.address(),
            max_retries = self.max_retries
        )
    )]
    pub async fn run(&self) {
        tracing::info!("Message pump started");

        let mut backoff = ReceiveBackoff::new(
            Duration::from_millis(500),
            Duration::from_millis(10_000),
        );

        while !self.cancel.is_cancelled() {
            let batch = match self.queue.receive(&self.cancel).await {
                Ok(batch) => {
                    backoff.reset();
                    batch
                }
                Err(error) => {
                    tracing::warn!(
                        error = %error,
                        "Receiving from the input queue failed"
                    );
                    backoff.wait(&self.cancel).await;
                    continue;
                }
            };

            // Every message of this batch is dispatched before the next
            // batch is fetched
            for raw in batch {
                self.process(raw).await;
            }
        }

        tracing::info!("Message pump stopped");
    }
}
