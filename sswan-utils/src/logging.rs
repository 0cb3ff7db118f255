//! Logging infrastructure for sswan
//!
//! Provides unified logging setup using the tracing ecosystem.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{paths, Result, SswanError};

/// Log output destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Log to stderr
    Stderr,
    /// Log to file under the XDG state dir
    File,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Output destination
    pub output: LogOutput,
    /// Log level filter (e.g., "info", "sswan=debug,tungstenite=warn")
    pub filter: String,
    /// Include file/line in logs
    pub file_line: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: "info".into(),
            file_line: false,
        }
    }
}

impl LogConfig {
    /// Config for the interactive client. Logs go to a file because stdout
    /// belongs to the message feed.
    pub fn client() -> Self {
        Self {
            output: LogOutput::File,
            filter: std::env::var("SSWAN_LOG").unwrap_or_else(|_| "warn".into()),
            file_line: false,
        }
    }

    /// Config for development (verbose stderr)
    pub fn development() -> Self {
        Self {
            output: LogOutput::Stderr,
            filter: std::env::var("SSWAN_LOG").unwrap_or_else(|_| "debug".into()),
            file_line: true,
        }
    }
}

/// Initialize logging with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| SswanError::config(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_file(config.file_line)
        .with_line_number(config.file_line);

    match config.output {
        LogOutput::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(std::io::stderr))
                .try_init()
                .map_err(|e| SswanError::internal(format!("Failed to init logging: {}", e)))?;
        }
        LogOutput::File => {
            let log_dir = paths::log_dir();
            paths::ensure_dir(&log_dir).map_err(|e| SswanError::FileWrite {
                path: log_dir.clone(),
                source: e,
            })?;

            let log_path = log_dir.join("sswan.log");
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .map_err(|e| SswanError::FileWrite {
                    path: log_path,
                    source: e,
                })?;

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_writer(file).with_ansi(false))
                .try_init()
                .map_err(|e| SswanError::internal(format!("Failed to init logging: {}", e)))?;
        }
    }

    Ok(())
}
