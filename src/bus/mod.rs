mod config;
mod errors;
mod send_bus;
mod startable;
mod transaction;

pub use config::{
    BusConfig, SendBusFactory, create_send_bus_factory, create_startable_bus,
};
pub use errors::{BusError, ConfigError};
pub use send_bus::{BusTransaction, SendBus};
pub use startable::StartableBus;
pub use transaction::TransactionContext;
