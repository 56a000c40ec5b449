use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Attribute carrying the fully-qualified wire type name.
pub const ATTR_MESSAGE_TYPE: &str = "messageType";
/// Attribute carrying the originating queue address.
pub const ATTR_SENDER: &str = "sender";
/// Attribute marking topic-originated messages, value `"True"`.
pub const ATTR_FROM_TOPIC: &str = "fromSns";
/// Receive attribute driving the retry count.
pub const RECEIVE_COUNT_ATTRIBUTE: &str = "ApproximateReceiveCount";

/// Caller-facing attribute map attached to outbound publishes.
pub type MessageAttributes = HashMap<String, String>;

/// A single envelope attribute in the provider's `{Value, Type}` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeAttribute {
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "Type")]
    pub data_type: String,
}

impl EnvelopeAttribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            data_type: "String".to_string(),
        }
    }
}

/// The outer wire document wrapping a payload when the topic service
/// forwards to a queue, and when the bus enqueues locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(
        rename = "MessageId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub message_id: Option<Uuid>,
    /// The inner serialized payload
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(
        rename = "Timestamp",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(rename = "MessageAttributes", default)]
    pub attributes: HashMap<String, EnvelopeAttribute>,
}

impl Envelope {
    /// Wraps a locally-built payload the way the topic service would,
    /// for direct enqueues that bypass the topic.
    pub fn wrap(
        body: String,
        attributes: MessageAttributes,
    ) -> Self {
        Self {
            message_id: Some(Uuid::now_v7()),
            message: body,
            timestamp: Some(Utc::now()),
            attributes: attributes
                .into_iter()
                .map(|(name, value)| (name, EnvelopeAttribute::string(value)))
                .collect(),
        }
    }

    /// Reads a string attribute by name.
    pub fn attribute(
        &self,
        name: &str,
    ) -> Option<&str> {
        self.attributes
            .get(name)
            .map(|attribute| attribute.value.as_str())
    }
}
