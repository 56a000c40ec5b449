mod backoff;
mod methods;
mod pump;

pub use pump::MessagePump;
