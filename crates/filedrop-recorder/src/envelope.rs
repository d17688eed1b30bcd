use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("message data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("message data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("notification is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Envelope POSTed by a Pub/Sub push subscription.
#[derive(Debug, Deserialize)]
pub struct PushEnvelope {
    pub message: PubsubMessage,
    #[serde(default)]
    pub subscription: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PubsubMessage {
    /// Base64-encoded message payload.
    pub data: String,
    #[serde(rename = "messageId", default)]
    pub message_id: String,
    #[serde(rename = "publishTime", default)]
    pub publish_time: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

/// A storage notification extracted from the message payload: the bucket and
/// the object path that landed in it.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundNotification {
    pub bucket: String,
    pub file: String,
}

impl PubsubMessage {
    /// Decodes the base64 payload and pulls `bucket` and `name` out of the
    /// storage notification JSON. Both must be present and non-empty.
    pub fn decode_notification(&self) -> Result<InboundNotification, ParseError> {
        let bytes = STANDARD.decode(&self.data)?;
        let text = String::from_utf8(bytes)?;
        let value: serde_json::Value = serde_json::from_str(&text)?;

        Ok(InboundNotification {
            bucket: required_field(&value, "bucket")?,
            file: required_field(&value, "name")?,
        })
    }
}

fn required_field(value: &serde_json::Value, key: &'static str) -> Result<String, ParseError> {
    match value.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(ParseError::MissingField(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_with(payload: &str) -> PubsubMessage {
        PubsubMessage {
            data: STANDARD.encode(payload),
            ..Default::default()
        }
    }

    #[test]
    fn extracts_bucket_and_name() {
        let message = message_with(r#"{"bucket": "my-bucket", "name": "report.csv"}"#);

        let notification = message.decode_notification().expect("should parse");
        assert_eq!(notification.bucket, "my-bucket");
        assert_eq!(notification.file, "report.csv");
    }

    #[test]
    fn extra_notification_fields_are_ignored() {
        let message = message_with(
            r#"{"bucket": "b", "name": "n", "contentType": "text/csv", "size": "123"}"#,
        );

        let notification = message.decode_notification().expect("should parse");
        assert_eq!(notification.bucket, "b");
        assert_eq!(notification.file, "n");
    }

    #[test]
    fn rejects_invalid_base64() {
        let message = PubsubMessage {
            data: "%%% not base64 %%%".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            message.decode_notification(),
            Err(ParseError::Base64(_))
        ));
    }

    #[test]
    fn rejects_non_json_payload() {
        let message = message_with("this is not json");

        assert!(matches!(
            message.decode_notification(),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn rejects_missing_bucket() {
        let message = message_with(r#"{"name": "report.csv"}"#);

        assert!(matches!(
            message.decode_notification(),
            Err(ParseError::MissingField("bucket"))
        ));
    }

    #[test]
    fn rejects_empty_name() {
        let message = message_with(r#"{"bucket": "my-bucket", "name": ""}"#);

        assert!(matches!(
            message.decode_notification(),
            Err(ParseError::MissingField("name"))
        ));
    }

    #[test]
    fn deserializes_push_envelope() {
        let body = format!(
            r#"{{
                "message": {{
                    "data": "{}",
                    "messageId": "1357924680",
                    "publishTime": "2024-03-01T12:00:00.000Z",
                    "attributes": {{"eventType": "OBJECT_FINALIZE"}}
                }},
                "subscription": "projects/proj1/subscriptions/upload-events"
            }}"#,
            STANDARD.encode(r#"{"bucket": "my-bucket", "name": "report.csv"}"#)
        );

        let envelope: PushEnvelope = serde_json::from_str(&body).expect("should deserialize");
        assert_eq!(envelope.message.message_id, "1357924680");
        assert_eq!(envelope.subscription, "projects/proj1/subscriptions/upload-events");
        assert_eq!(
            envelope.message.attributes.get("eventType").map(String::as_str),
            Some("OBJECT_FINALIZE")
        );

        let notification = envelope.message.decode_notification().expect("should parse");
        assert_eq!(notification.bucket, "my-bucket");
    }
}
