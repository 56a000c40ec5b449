use super::{PublishError, TopicTransport};
use crate::envelope::{ATTR_FROM_TOPIC, ATTR_MESSAGE_TYPE, MessageAttributes};
use crate::models::{Message, topic_name};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Publishes serialized payloads to the topic derived from their type.
///
/// Topic ids are cached on first use and never cleared for the process
/// lifetime. Safe for concurrent `publish` calls.
pub struct TopicPublisher {
    transport: Arc<dyn TopicTransport>,
    topics: RwLock<HashMap<String, String>>,
}

impl TopicPublisher {
    pub fn new(transport: Arc<dyn TopicTransport>) -> Self {
        Self {
            transport,
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Ensures a topic exists for each declared publishable type name,
    /// creating missing topics and recording their ids.
    pub async fn register_types(
        &self,
        type_names: &[&str],
    ) -> Result<(), PublishError> {
        for name in type_names {
            let topic = topic_name(name);
            if self.cached(&topic).is_some() {
                continue;
            }

            let id = self
                .transport
                .create_topic(&topic)
                .await
                .map_err(|source| PublishError::Transport {
                    name: name.to_string(),
                    source,
                })?;
            self.cache(topic, id);
        }
        Ok(())
    }

    /// Ensures a topic exists for one publishable message type.
    pub async fn register<M: Message>(&self) -> Result<(), PublishError> {
        self.register_types(&[M::NAME]).await
    }

    /// Publishes a serialized body to the topic for `type_name`.
    ///
    /// The emitted attributes are the caller's plus `messageType` and the
    /// topic-origin marker.
    #[tracing::instrument(
        skip(self, body, attributes),
        fields(message_type = type_name),
        err
    )]
    pub async fn publish(
        &self,
        body: &str,
        type_name: &str,
        mut attributes: MessageAttributes,
    ) -> Result<(), PublishError> {
        let topic = topic_name(type_name);

        let id = match self.cached(&topic) {
            Some(id) => id,
            None => {
                // Fall back to a lookup before failing: another producer
                // may have created the topic already.
                let found = self
                    .transport
                    .find_topic(&topic)
                    .await
                    .map_err(|source| PublishError::Transport {
                        name: type_name.to_string(),
                        source,
                    })?;
                match found {
                    Some(id) => {
                        self.cache(topic.clone(), id.clone());
                        id
                    }
                    None => {
                        return Err(PublishError::UnknownTopic {
                            name: type_name.to_string(),
                            topic,
                        });
                    }
                }
            }
        };

        attributes.insert(
            ATTR_MESSAGE_TYPE.to_string(),
            type_name.to_string(),
        );
        attributes.insert(ATTR_FROM_TOPIC.to_string(), "True".to_string());

        self.transport
            .publish(&id, body, &attributes)
            .await
            .map_err(|source| PublishError::Transport {
                name: type_name.to_string(),
                source,
            })
    }

    fn cached(
        &self,
        topic: &str,
    ) -> Option<String> {
        self.topics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(topic)
            .cloned()
    }

    fn cache(
        &self,
        topic: String,
        id: String,
    ) {
        self.topics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(topic, id);
    }
}
