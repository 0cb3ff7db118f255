//! Command-line argument parsing for the sswan client
//!
//! Uses clap for argument parsing with derive macros.

use clap::Parser;

/// sswan - minimal real-time messaging client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Server endpoint (ws://host:port/path)
    ///
    /// Overrides the `server_url` key in the config file.
    /// Example: ws://localhost:4000/ws
    #[arg(long, env = "SSWAN_SERVER")]
    pub server: Option<String>,

    /// Log verbosely to stderr instead of the log file
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
