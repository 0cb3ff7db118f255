//! Transport event types
//!
//! The four transport callbacks (open, message, error, close) are reified
//! as one enum so the session consumes them as named transitions, in the
//! order the transport delivered them.

/// Normal-closure status code, sent on deliberate shutdown
pub const CLOSE_NORMAL: u16 = 1000;

/// Synthesized when a close frame carries no status code
pub const CLOSE_NO_STATUS: u16 = 1005;

/// Synthesized when the peer vanishes without a closing handshake
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Reason attached to the close frame on deliberate shutdown
pub const SHUTDOWN_REASON: &str = "client session ended";

/// One signal from the transport driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The opening handshake completed
    Opened,
    /// One inbound text frame, exactly as received
    Frame(String),
    /// Transport-level failure; does not itself end the connection, a
    /// `Closed` event follows separately
    TransportError(String),
    /// The transport is gone; code/reason come from the close frame when
    /// one was received
    Closed { code: u16, reason: Option<String> },
}

impl TransportEvent {
    /// True for the events that terminate the transport
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_closed() {
        assert!(TransportEvent::Closed {
            code: CLOSE_NORMAL,
            reason: None
        }
        .is_closed());
        assert!(!TransportEvent::Opened.is_closed());
        assert!(!TransportEvent::Frame("{}".into()).is_closed());
        assert!(!TransportEvent::TransportError("reset".into()).is_closed());
    }

    #[test]
    fn test_events_compare_by_content() {
        assert_eq!(
            TransportEvent::Frame("a".into()),
            TransportEvent::Frame("a".into())
        );
        assert_ne!(
            TransportEvent::Closed {
                code: CLOSE_NORMAL,
                reason: None
            },
            TransportEvent::Closed {
                code: CLOSE_ABNORMAL,
                reason: None
            }
        );
    }
}
