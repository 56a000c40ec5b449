mod dispatcher;
mod errors;

pub use dispatcher::{Dispatcher, MessageProcessingResult};
pub use errors::DispatchError;
