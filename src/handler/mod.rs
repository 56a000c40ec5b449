mod errors;
mod handler_group;
mod handler_registry;
mod message_handler;

pub(crate) use handler_group::{FaultHandlerGroup, HandlerGroup, TransportFaultAdapter};

pub use errors::HandlerError;
pub use handler_registry::HandlerRegistry;
pub use message_handler::{
    FaultHandler, HandlerContext, MessageHandler, TransportFaultHandler,
};
