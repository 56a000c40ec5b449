mod errors;
mod queue_client;
mod topic_publisher;
mod traits;

pub use errors::{PublishError, TransportError};
pub use queue_client::QueueClient;
pub use topic_publisher::TopicPublisher;
pub use traits::{QueueTransport, ReceivedMessage, TopicTransport};
