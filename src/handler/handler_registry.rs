use super::handler_group::{
    FaultGroup, FaultHandlerGroup, Group, HandlerGroup, TransportFaultAdapter,
    TransportFaultFactoryAdapter,
};
use super::message_handler::{
    FaultHandler, HandlerContext, MessageHandler, TransportFaultHandler,
};
use crate::models::{Message, MessageTypeId};
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;

/// Holds the handler set and the fault-handler set for each message type.
///
/// Populated at bus construction and immutable afterwards; shared
/// read-only by every pump. Each registration stores a factory so a fresh
/// handler instance is constructed per dispatch.
pub struct HandlerRegistry {
    handlers: HashMap<i32, Box<dyn HandlerGroup>>,
    fault_handlers: HashMap<i32, Box<dyn FaultHandlerGroup>>,
    transport_fault_handlers: Vec<Box<dyn TransportFaultAdapter>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            fault_handlers: HashMap::new(),
            transport_fault_handlers: Vec::new(),
        }
    }

    pub fn with_handler<M, H, F>(
        &mut self,
        factory: F,
    ) where
        M: Message,
        H: MessageHandler<M> + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        let group = self
            .handlers
            .entry(M::HASH)
            .or_insert_with(|| Box::new(Group::<M>::new()));

        // Convert to &mut dyn Any in order to be able to downcast
        let any_ref = group.as_mut() as &mut (dyn Any + '_);
        let group = any_ref
            .downcast_mut::<Group<M>>()
            .expect("Could not downcast to group. This indicates a hash collision between message types");

        group.register(factory);
    }

    pub fn with_fault_handler<M, H, F>(
        &mut self,
        factory: F,
    ) where
        M: Message,
        H: FaultHandler<M> + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        let group = self
            .fault_handlers
            .entry(M::HASH)
            .or_insert_with(|| Box::new(FaultGroup::<M>::new()));

        let any_ref = group.as_mut() as &mut (dyn Any + '_);
        let group = any_ref
            .downcast_mut::<FaultGroup<M>>()
            .expect("Could not downcast to group. This indicates a hash collision between message types");

        group.register(factory);
    }

    pub fn with_transport_fault_handler<H, F>(
        &mut self,
        factory: F,
    ) where
        H: TransportFaultHandler + 'static,
        F: Fn(&HandlerContext) -> H + Send + Sync + 'static,
    {
        self.transport_fault_handlers.push(Box::new(
            TransportFaultFactoryAdapter {
                factory,
                _handler: PhantomData,
            },
        ));
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// The types with at least one registered handler; the input queue
    /// subscribes to their topics.
    pub fn handled_types(&self) -> Vec<MessageTypeId> {
        self.handlers
            .values()
            .map(|group| group.message_type())
            .collect()
    }

    pub(crate) fn handlers_for(
        &self,
        hash: i32,
    ) -> Option<&dyn HandlerGroup> {
        self.handlers.get(&hash).map(|group| group.as_ref())
    }

    pub(crate) fn fault_handlers_for(
        &self,
        hash: i32,
    ) -> Option<&dyn FaultHandlerGroup> {
        self.fault_handlers.get(&hash).map(|group| group.as_ref())
    }

    pub(crate) fn transport_fault_handlers(
        &self
    ) -> &[Box<dyn TransportFaultAdapter>] {
        &self.transport_fault_handlers
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
