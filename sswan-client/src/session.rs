//! Session state machine
//!
//! Owns everything the connection lifecycle mutates: the per-session client
//! identity, the current connection status and the feed of received
//! messages. Transport events arrive as named transitions, which keeps the
//! send precondition and teardown behavior testable without any I/O.

// Allow unused code that's part of the public API
#![allow(dead_code)]

use std::fmt;

use sswan_protocol::{ClientId, Envelope};
use sswan_utils::{Result, SswanError};

use crate::connection::TransportEvent;

/// Sentinel used when a close frame carries no reason text
const NO_REASON: &str = "No reason given";

/// Why the session left the `Connected` state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The transport closed; code and reason come verbatim from the close
    /// frame
    Closed { code: u16, reason: String },
    /// A send was attempted while the transport was not open
    CannotSend,
}

/// Connection lifecycle state. Exactly one value is current at any time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected(DisconnectReason),
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting..."),
            Self::Connected => write!(f, "Connected"),
            Self::Disconnected(DisconnectReason::Closed { code, reason }) => {
                write!(f, "Disconnected: {} (Code: {})", reason, code)
            }
            Self::Disconnected(DisconnectReason::CannotSend) => {
                write!(f, "Disconnected (Cannot Send)")
            }
            Self::Error => write!(f, "Error"),
        }
    }
}

/// One entry in the received-message feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEntry {
    /// An accepted envelope from another client
    Message(Envelope),
    /// A frame that did not decode; kept verbatim so the failure is visible
    Invalid { raw: String },
}

/// Per-session state container.
///
/// Created once when the client starts and dropped when it exits. The feed
/// is append-only and unbounded; a session lives for one interactive run.
pub struct Session {
    id: ClientId,
    status: ConnectionStatus,
    feed: Vec<FeedEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_identity(ClientId::generate())
    }

    /// Create a session with a fixed identity (used by tests)
    pub fn with_identity(id: ClientId) -> Self {
        Self {
            id,
            status: ConnectionStatus::Connecting,
            feed: Vec::new(),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.id
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// The received-message feed, oldest first
    pub fn feed(&self) -> &[FeedEntry] {
        &self.feed
    }

    /// Mark the session as attempting to open a transport
    pub fn begin_connect(&mut self) {
        self.status = ConnectionStatus::Connecting;
    }

    /// Apply one transport event as a state transition
    pub fn apply(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Frame(raw) => self.on_frame(&raw),
            TransportEvent::TransportError(detail) => self.on_transport_error(&detail),
            TransportEvent::Closed { code, reason } => self.on_close(code, reason),
        }
    }

    /// The transport finished its opening handshake
    pub fn on_open(&mut self) {
        tracing::info!("transport open");
        self.status = ConnectionStatus::Connected;
    }

    /// The transport reported a failure. The transport itself is not closed
    /// by this; a close event follows separately.
    pub fn on_transport_error(&mut self, detail: &str) {
        tracing::error!("transport error: {}", detail);
        self.status = ConnectionStatus::Error;
    }

    /// The transport closed, deliberately or not
    pub fn on_close(&mut self, code: u16, reason: Option<String>) {
        let reason = reason
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| NO_REASON.to_string());
        tracing::info!(code, reason = %reason, "transport closed");
        self.status = ConnectionStatus::Disconnected(DisconnectReason::Closed { code, reason });
    }

    /// One inbound text frame: decode, self-filter, append
    pub fn on_frame(&mut self, raw: &str) {
        match Envelope::decode(raw) {
            Ok(envelope) if envelope.is_from(&self.id) => {
                tracing::debug!("dropping echo of our own message");
            }
            Ok(envelope) => {
                tracing::debug!(kind = envelope.kind.as_str(), "accepted message");
                self.feed.push(FeedEntry::Message(envelope));
            }
            Err(e) => {
                tracing::warn!("undecodable frame: {}", e);
                self.feed.push(FeedEntry::Invalid {
                    raw: raw.to_string(),
                });
            }
        }
    }

    /// Prepare a draft envelope for transmission.
    ///
    /// Fails unless the session is connected; a refused send forces the
    /// status to `Disconnected (Cannot Send)`. On success the local identity
    /// overwrites whatever sender the caller supplied, and the sealed
    /// envelope is returned as one wire frame.
    pub fn seal(&mut self, mut draft: Envelope) -> Result<String> {
        if !self.is_connected() {
            tracing::warn!("send rejected: not connected");
            self.status = ConnectionStatus::Disconnected(DisconnectReason::CannotSend);
            return Err(SswanError::NotConnected);
        }

        if draft.payload_text().is_some_and(str::is_empty) {
            tracing::debug!("send rejected: empty message");
            return Err(SswanError::EmptyMessage);
        }

        draft.sender = Some(self.id.clone());
        draft
            .encode()
            .map_err(|e| SswanError::protocol(e.to_string()))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
