//! Per-session client identity

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for one client session.
///
/// Generated once at startup and stable until the process exits. It is only
/// used to recognize our own messages when the server broadcasts them back;
/// it is not a credential and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh random identity (`client_<random>`)
    pub fn generate() -> Self {
        Self(format!("client_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix for display purposes
    pub fn short(&self) -> &str {
        self.0.get(..15).unwrap_or(&self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ClientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_has_prefix() {
        let id = ClientId::generate();
        assert!(id.as_str().starts_with("client_"));
    }

    #[test]
    fn test_generate_is_unique() {
        let a = ClientId::generate();
        let b = ClientId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = ClientId::from("client_abc123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"client_abc123\"");

        let back: ClientId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_short_truncates() {
        let id = ClientId::from("client_0123456789abcdef");
        assert_eq!(id.short(), "client_01234567");

        let tiny = ClientId::from("c1");
        assert_eq!(tiny.short(), "c1");
    }

    #[test]
    fn test_display() {
        let id = ClientId::from("client_xyz");
        assert_eq!(id.to_string(), "client_xyz");
    }
}
