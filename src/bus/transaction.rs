use super::send_bus::SendBus;
use crate::codec::{Codec, CodecError};
use crate::transport::PublishError;
use std::sync::{Arc, Mutex, PoisonError};

pub(crate) enum OutboundMode {
    Publish,
    SendLocal,
}

/// One deferred outbound message.
///
/// The builder closure captures the caller's value or builder and is only
/// invoked at commit, so a discarded transaction never serializes.
pub(crate) struct PendingOutbound {
    pub(crate) mode: OutboundMode,
    pub(crate) type_name: &'static str,
    pub(crate) build:
        Box<dyn FnOnce(&dyn Codec) -> Result<String, CodecError> + Send>,
}

/// Explicit transaction scope for outbound sends.
///
/// A send bus carrying an active context buffers publishes instead of
/// sending them; `commit` flushes the buffer in insertion order and
/// `discard` drops it unread. A context is completed at most once; after
/// completion, enlistment fails and sends fall back to immediate delivery.
#[derive(Clone)]
pub struct TransactionContext {
    pending: Arc<Mutex<Option<Vec<PendingOutbound>>>>,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(Some(Vec::new()))),
        }
    }

    pub fn is_active(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Appends an entry to the buffer; returns the entry when the scope
    /// has already completed so the caller can send it immediately.
    pub(crate) fn enlist(
        &self,
        entry: PendingOutbound,
    ) -> Result<(), PendingOutbound> {
        match self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            Some(buffer) => {
                buffer.push(entry);
                Ok(())
            }
            None => Err(entry),
        }
    }

    /// Builds, serializes, and sends every buffered entry in insertion
    /// order. A failed send drops the remaining entries with the error.
    pub async fn commit(
        &self,
        bus: &SendBus,
    ) -> Result<(), PublishError> {
        let entries = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(entries) = entries else {
            return Ok(());
        };

        for entry in entries {
            bus.flush(entry).await?;
        }
        Ok(())
    }

    /// Drops the buffer without invoking any builder.
    pub fn discard(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl Default for TransactionContext {
    fn default() -> Self {
        Self::new()
    }
}
