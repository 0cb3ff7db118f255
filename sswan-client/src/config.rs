//! Client-side configuration loading
//!
//! Resolves the server endpoint: CLI/environment override first, then the
//! shared config file, then the built-in default.

use serde::Deserialize;
use url::Url;

use sswan_utils::{config_file, Result, SswanError};

/// Default endpoint, matching the development server
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:4000/ws";

/// Client configuration (subset read from the config file)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ClientConfig {
    server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
        }
    }
}

/// Resolve the server URL to connect to.
///
/// `override_url` (from `--server` or `SSWAN_SERVER`) wins when present.
/// The result is always validated.
pub fn resolve_server_url(override_url: Option<&str>) -> Result<String> {
    let url = match override_url {
        Some(url) => url.to_string(),
        None => load_file_config().server_url,
    };
    validate_server_url(&url)?;
    Ok(url)
}

/// Load the config file, falling back to defaults if it is missing or
/// unparsable.
fn load_file_config() -> ClientConfig {
    let path = config_file();

    if !path.exists() {
        tracing::debug!("Config file not found, using defaults");
        return ClientConfig::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<ClientConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to parse config file: {}, using defaults", e);
                ClientConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file: {}, using defaults", e);
            ClientConfig::default()
        }
    }
}

/// Check that the endpoint is a ws:// or wss:// URL
pub fn validate_server_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| SswanError::config(format!("Invalid server URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(SswanError::config(format!(
            "Unsupported scheme '{}' in server URL '{}' (expected ws or wss)",
            other, raw
        ))),
    }
}
