//! sswan client - terminal front end for the sswan messaging server
//!
//! Opens a WebSocket to the configured server, prints messages broadcast
//! by other clients, and sends lines typed on stdin.

use sswan_utils::{init_logging_with_config, LogConfig, Result};

mod app;
mod cli;
mod config;
mod connection;
mod session;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    // Log to file by default: stdout belongs to the message feed
    let log_config = if args.verbose {
        LogConfig::development()
    } else {
        LogConfig::client()
    };
    init_logging_with_config(log_config)?;
    tracing::info!("sswan client starting");

    let server_url = config::resolve_server_url(args.server.as_deref())?;
    tracing::debug!(url = %server_url, "resolved server endpoint");

    match app::run(server_url).await {
        Ok(()) => {
            tracing::info!("sswan client exiting normally");
            Ok(())
        }
        Err(e) => {
            tracing::error!("sswan client error: {}", e);
            eprintln!("Error: {}", e);
            Err(e)
        }
    }
}
