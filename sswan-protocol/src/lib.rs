//! sswan-protocol: Shared wire definitions for client-server communication
//!
//! This crate defines the message envelope exchanged with the sswan server
//! over WebSocket, and the per-session client identity used to suppress
//! echoes of our own broadcasts. The wire format is one UTF-8 JSON text
//! frame per envelope.

pub mod envelope;
pub mod identity;

// Re-export main types at crate root
pub use envelope::{Envelope, EnvelopeKind, ProtocolError};
pub use identity::ClientId;
