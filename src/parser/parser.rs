use super::ParseError;
use crate::codec::Codec;
use crate::envelope::{ATTR_MESSAGE_TYPE, Envelope, RECEIVE_COUNT_ATTRIBUTE};
use crate::models::TransportMessage;
use crate::registry::TypeRegistry;
use crate::transport::ReceivedMessage;
use std::sync::Arc;

/// Decodes raw queue messages into [`TransportMessage`]s.
///
/// Parsing never raises: every failure is captured on the returned message
/// so the pump can still acknowledge or dead-letter it by receipt handle.
pub struct MessageParser {
    types: Arc<TypeRegistry>,
    codec: Arc<dyn Codec>,
}

impl MessageParser {
    pub fn new(
        types: Arc<TypeRegistry>,
        codec: Arc<dyn Codec>,
    ) -> Self {
        Self { types, codec }
    }

    pub fn parse(
        &self,
        raw: &ReceivedMessage,
    ) -> TransportMessage {
        let retry_count = raw
            .attributes
            .get(RECEIVE_COUNT_ATTRIBUTE)
            .and_then(|count| count.parse().ok())
            .unwrap_or(1);

        let mut message = TransportMessage {
            receipt_handle: raw.receipt_handle.clone(),
            retry_count,
            body: String::new(),
            message_type_name: String::new(),
            message_type: None,
            message: None,
            parsing_succeeded: false,
            parse_error: None,
        };

        match self.parse_envelope(&raw.body, &mut message) {
            Ok(()) => message.parsing_succeeded = true,
            Err(error) => {
                tracing::debug!(
                    message_type = %message.message_type_name,
                    error = %error,
                    "Failed to parse a received message"
                );
                message.parse_error = Some(error);
            }
        }

        message
    }

    fn parse_envelope(
        &self,
        raw_body: &str,
        into: &mut TransportMessage,
    ) -> Result<(), ParseError> {
        let envelope: Envelope =
            serde_json::from_str(raw_body).map_err(ParseError::Envelope)?;

        let type_name = envelope
            .attribute(ATTR_MESSAGE_TYPE)
            .ok_or(ParseError::MissingTypeAttribute)?
            .to_string();

        into.message_type_name = type_name.clone();
        into.body = envelope.message;

        let entry = self
            .types
            .resolve(&type_name)
            .ok_or(ParseError::UnknownType { name: type_name })?;
        into.message_type = Some(entry.id());

        let payload = entry
            .decode(&into.body, self.codec.as_ref())
            .map_err(|source| ParseError::Payload {
                name: entry.id().name.to_string(),
                source,
            })?;
        into.message = Some(payload);

        Ok(())
    }
}
