//! Payload model and inbound message decoding.

use bytes::Bytes;
use serde_json::Value;

/// Liveness probe text sent to the server.
pub const PING: &str = "ping";

/// Liveness ack text expected back from the server.
pub const PONG: &str = "pong";

/// A message payload as seen by listeners and accepted by `send`.
///
/// Inbound text frames that decode as JSON are delivered as [`Payload::Json`];
/// text that fails to decode is delivered unchanged as [`Payload::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Binary(Bytes),
    /// Decoded JSON value.
    Json(Value),
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_owned())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(Bytes::from(bytes))
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Binary(bytes)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// Decoded form of an inbound frame.
pub(crate) enum Incoming {
    /// The liveness ack; consumed internally, never delivered to listeners.
    Ack,
    /// Anything else; delivered to message listeners.
    Deliver(Payload),
}

/// Decode an inbound frame.
///
/// Text is first parsed as JSON; parse failure falls back to the raw text.
/// The ack is recognized both as the JSON-encoded string and as raw text.
pub(crate) fn decode_incoming(payload: Payload) -> Incoming {
    match payload {
        Payload::Text(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::String(s)) if s == PONG => Incoming::Ack,
            Ok(value) => Incoming::Deliver(Payload::Json(value)),
            Err(_) if text == PONG => Incoming::Ack,
            Err(_) => Incoming::Deliver(Payload::Text(text)),
        },
        other => Incoming::Deliver(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_json_text_falls_back_to_raw() {
        let decoded = decode_incoming(Payload::Text("not-json-at-all".into()));
        match decoded {
            Incoming::Deliver(Payload::Text(text)) => assert_eq!(text, "not-json-at-all"),
            _ => panic!("expected raw text delivery"),
        }
    }

    #[test]
    fn test_json_object_is_decoded() {
        let decoded = decode_incoming(Payload::Text(r#"{"a":1}"#.into()));
        match decoded {
            Incoming::Deliver(Payload::Json(value)) => assert_eq!(value, json!({"a": 1})),
            _ => panic!("expected decoded JSON delivery"),
        }
    }

    #[test]
    fn test_ack_is_consumed() {
        // JSON-encoded string
        assert!(matches!(
            decode_incoming(Payload::Text("\"pong\"".into())),
            Incoming::Ack
        ));
        // Raw text
        assert!(matches!(
            decode_incoming(Payload::Text("pong".into())),
            Incoming::Ack
        ));
    }

    #[test]
    fn test_other_json_strings_are_delivered() {
        let decoded = decode_incoming(Payload::Text("\"hello\"".into()));
        match decoded {
            Incoming::Deliver(Payload::Json(Value::String(s))) => assert_eq!(s, "hello"),
            _ => panic!("expected JSON string delivery"),
        }
    }

    #[test]
    fn test_binary_passes_through() {
        let decoded = decode_incoming(Payload::Binary(Bytes::from_static(b"\x01\x02")));
        match decoded {
            Incoming::Deliver(Payload::Binary(bytes)) => assert_eq!(&bytes[..], b"\x01\x02"),
            _ => panic!("expected binary delivery"),
        }
    }

    #[test]
    fn test_payload_conversions() {
        assert_eq!(Payload::from("hi"), Payload::Text("hi".into()));
        assert_eq!(
            Payload::from(vec![1u8, 2]),
            Payload::Binary(Bytes::from_static(&[1, 2]))
        );
        assert_eq!(Payload::from(json!(42)), Payload::Json(json!(42)));
    }
}
