//! Message envelope and JSON wire codec

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identity::ClientId;

/// Protocol codec error
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Invalid envelope: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Serialization error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Envelope category.
///
/// The server treats this as an opaque string, so unknown values coming off
/// the wire are preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    /// Request the server to echo the payload back
    Echo,
    /// Plain broadcast chat message
    Message,
    /// Error report
    Error,
    /// Any kind this client does not know about
    #[serde(untagged)]
    Other(String),
}

impl EnvelopeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Echo => "echo",
            Self::Message => "message",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }
}

/// The unit of exchange with the server: one envelope per WebSocket text
/// frame.
///
/// `target` and `room` are carried for forward compatibility with directed
/// delivery and room routing; no current logic consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,

    /// Free-form payload; a plain string for chat messages
    pub payload: Value,

    /// Identity of the originating client, stamped on send
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<ClientId>,

    /// Optional: specific client this envelope is intended for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl Envelope {
    /// Create a draft envelope. The sender is left unset; the session stamps
    /// it on send.
    pub fn new(kind: EnvelopeKind, payload: impl Into<Value>) -> Self {
        Self {
            kind,
            payload: payload.into(),
            sender: None,
            target: None,
            room: None,
        }
    }

    /// Convenience constructor for a plain chat message
    pub fn message(text: impl Into<String>) -> Self {
        Self::new(EnvelopeKind::Message, text.into())
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Decode one wire frame. Malformed text or a missing `type`/`payload`
    /// field is an error the caller must surface.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(raw).map_err(ProtocolError::Decode)
    }

    /// Encode to a single-line JSON frame
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    /// Self-filter predicate: was this envelope authored by `id`?
    pub fn is_from(&self, id: &ClientId) -> bool {
        self.sender.as_ref() == Some(id)
    }

    /// Payload as text, if it is a JSON string
    pub fn payload_text(&self) -> Option<&str> {
        self.payload.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_chat_message() {
        let mut env = Envelope::message("hi");
        env.sender = Some(ClientId::from("client_a1"));

        let raw = env.encode().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["type"], "message");
        assert_eq!(value["payload"], "hi");
        assert_eq!(value["sender"], "client_a1");
    }

    #[test]
    fn test_optional_fields_omitted_when_absent() {
        let raw = Envelope::message("hi").encode().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();

        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("sender"));
        assert!(!obj.contains_key("target"));
        assert!(!obj.contains_key("room"));
    }

    #[test]
    fn test_target_and_room_carried_verbatim() {
        let env = Envelope::message("hi")
            .with_target("client_b2")
            .with_room("lobby");

        let raw = env.encode().unwrap();
        let back = Envelope::decode(&raw).unwrap();

        assert_eq!(back.target.as_deref(), Some("client_b2"));
        assert_eq!(back.room.as_deref(), Some("lobby"));
    }

    #[test]
    fn test_decode_minimal_frame() {
        let env = Envelope::decode(r#"{"type":"echo","payload":"ping"}"#).unwrap();
        assert_eq!(env.kind, EnvelopeKind::Echo);
        assert_eq!(env.payload_text(), Some("ping"));
        assert!(env.sender.is_none());
    }

    #[test]
    fn test_decode_unknown_kind_preserved() {
        let env = Envelope::decode(r#"{"type":"presence","payload":"joined"}"#).unwrap();
        assert_eq!(env.kind, EnvelopeKind::Other("presence".into()));
        assert_eq!(env.kind.as_str(), "presence");
    }

    #[test]
    fn test_decode_structured_payload() {
        let env =
            Envelope::decode(r#"{"type":"message","payload":{"text":"hi","ts":7}}"#).unwrap();
        assert_eq!(env.payload, json!({"text": "hi", "ts": 7}));
        assert!(env.payload_text().is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_text() {
        assert!(matches!(
            Envelope::decode("{not valid json"),
            Err(ProtocolError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_missing_required_fields() {
        // No payload
        assert!(Envelope::decode(r#"{"type":"message"}"#).is_err());
        // No type
        assert!(Envelope::decode(r#"{"payload":"hi"}"#).is_err());
        // Right syntax, wrong shape
        assert!(Envelope::decode(r#"[1, 2, 3]"#).is_err());
    }

    #[test]
    fn test_is_from() {
        let me = ClientId::from("client_me");
        let other = ClientId::from("client_other");

        let mut env = Envelope::message("hello");
        assert!(!env.is_from(&me));

        env.sender = Some(other);
        assert!(!env.is_from(&me));

        env.sender = Some(me.clone());
        assert!(env.is_from(&me));
    }

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            EnvelopeKind::Echo,
            EnvelopeKind::Message,
            EnvelopeKind::Error,
            EnvelopeKind::Other("join".into()),
        ] {
            let raw = Envelope::new(kind.clone(), "x").encode().unwrap();
            let back = Envelope::decode(&raw).unwrap();
            assert_eq!(back.kind, kind);
        }
    }
}
