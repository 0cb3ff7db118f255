//! Error types for sswan
//!
//! Provides a unified error type used across all sswan crates.

use std::path::PathBuf;

/// Main error type for sswan operations
#[derive(Debug, thiserror::Error)]
pub enum SswanError {
    // === IO Errors ===

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    // === Connection Errors ===

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connection closed unexpectedly")]
    ConnectionClosed,

    #[error("Not connected to server")]
    NotConnected,

    // === Protocol Errors ===

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Cannot send an empty message")]
    EmptyMessage,

    // === Configuration Errors ===

    #[error("Configuration error: {0}")]
    Config(String),

    // === Internal Errors ===

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SswanError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Errors raised by a refused send, which leave the transport usable
    pub fn is_send_rejection(&self) -> bool {
        matches!(self, Self::NotConnected | Self::EmptyMessage)
    }
}

/// Result type alias using SswanError
pub type Result<T> = std::result::Result<T, SswanError>;
