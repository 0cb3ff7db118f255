//! Client-server connection management
//!
//! Provides the WebSocket connection to the sswan server with async
//! dispatch of transport events to the session state machine.

mod client;
mod events;

pub use client::Connection;
pub use events::{
    TransportEvent, CLOSE_ABNORMAL, CLOSE_NORMAL, CLOSE_NO_STATUS, SHUTDOWN_REASON,
};
