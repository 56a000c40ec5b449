use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Exponential backoff for transient receive errors.
///
/// Doubles from the base duration per failed attempt up to the ceiling;
/// a successful receive resets it.
pub(crate) struct ReceiveBackoff {
    duration: Duration,
    duration_max: Duration,
    failed_attempts: u32,
}

impl ReceiveBackoff {
    pub(crate) fn new(
        duration: Duration,
        duration_max: Duration,
    ) -> Self {
        Self {
            duration,
            duration_max,
            failed_attempts: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.failed_attempts = 0;
    }

    fn next(&mut self) -> Duration {
        // Cap the exponent so the shift cannot overflow
        let exponent = self.failed_attempts.min(16);
        self.failed_attempts += 1;
        self.duration
            .saturating_mul(1 << exponent)
            .min(self.duration_max)
    }

    /// Sleeps for the next backoff period, returning early on
    /// cancellation.
    pub(crate) async fn wait(
        &mut self,
        cancel: &CancellationToken,
    ) {
        let duration = self.next();
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(duration) => {}
        }
    }
}
