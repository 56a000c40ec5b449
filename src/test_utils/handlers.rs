use super::messages::TestMessage;
use crate::bus::SendBus;
use crate::dispatcher::DispatchError;
use crate::handler::{
    FaultHandler, HandlerError, MessageHandler, TransportFaultHandler,
};
use crate::models::TransportMessage;
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};

/// Records every handler invocation as (handler name, message name).
#[derive(Default)]
pub struct HandlerState {
    pub seen: Vec<(String, String)>,
}

pub type SharedHandlerState = Arc<Mutex<HandlerState>>;

pub struct CountingHandler {
    name: &'static str,
    state: SharedHandlerState,
    fail: bool,
}

impl CountingHandler {
    pub fn new(
        name: &'static str,
        state: &SharedHandlerState,
        fail: bool,
    ) -> Self {
        Self {
            name,
            state: Arc::clone(state),
            fail,
        }
    }
}

impl MessageHandler<TestMessage> for CountingHandler {
    fn handle<'a>(
        &'a self,
        message: TestMessage,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            self.state
                .lock()
                .expect("state lock")
                .seen
                .push((self.name.to_string(), message.name));
            if self.fail {
                Err(HandlerError::msg("induced failure"))
            } else {
                Ok(())
            }
        })
    }
}

pub struct RecordingFaultHandler {
    state: SharedHandlerState,
}

impl RecordingFaultHandler {
    pub fn new(state: &SharedHandlerState) -> Self {
        Self {
            state: Arc::clone(state),
        }
    }
}

impl FaultHandler<TestMessage> for RecordingFaultHandler {
    fn handle<'a>(
        &'a self,
        message: TestMessage,
        _error: &'a DispatchError,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            self.state
                .lock()
                .expect("state lock")
                .seen
                .push(("typed-fault".to_string(), message.name));
            Ok(())
        })
    }
}

pub struct RecordingTransportFaultHandler {
    state: SharedHandlerState,
}

impl RecordingTransportFaultHandler {
    pub fn new(state: &SharedHandlerState) -> Self {
        Self {
            state: Arc::clone(state),
        }
    }
}

impl TransportFaultHandler for RecordingTransportFaultHandler {
    fn handle<'a>(
        &'a self,
        message: &'a TransportMessage,
        _error: &'a DispatchError,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            self.state.lock().expect("state lock").seen.push((
                "transport-fault".to_string(),
                message.message_type_name.clone(),
            ));
            Ok(())
        })
    }
}

/// Publishes a derived message through the injected bus, optionally
/// failing afterwards. Used to prove that handler outbound flushes with
/// the dispatch.
pub struct RepublishingHandler {
    bus: SendBus,
    fail: bool,
}

impl RepublishingHandler {
    pub fn new(bus: SendBus) -> Self {
        Self { bus, fail: false }
    }

    pub fn failing(bus: SendBus) -> Self {
        Self { bus, fail: true }
    }
}

impl MessageHandler<TestMessage> for RepublishingHandler {
    fn handle<'a>(
        &'a self,
        message: TestMessage,
    ) -> BoxFuture<'a, Result<(), HandlerError>> {
        Box::pin(async move {
            self.bus
                .publish(TestMessage {
                    name: format!("re:{}", message.name),
                })
                .await
                .map_err(|error| {
                    HandlerError::Other(Box::new(error))
                })?;

            if self.fail {
                Err(HandlerError::msg("induced failure"))
            } else {
                Ok(())
            }
        })
    }
}
