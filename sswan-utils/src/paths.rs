//! Path utilities for sswan
//!
//! Handles XDG Base Directory specification compliance for config and
//! state directories.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Application identifier for XDG directories
const APP_NAME: &str = "sswan";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory
///
/// Location: `$XDG_CONFIG_HOME/sswan` or `~/.config/sswan`
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| fallback_home().join(".config").join(APP_NAME))
}

/// Get the main configuration file path
///
/// Location: `$XDG_CONFIG_HOME/sswan/config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the state directory
///
/// Location: `$XDG_STATE_HOME/sswan` or `~/.local/state/sswan`
pub fn state_dir() -> PathBuf {
    project_dirs()
        .and_then(|p| p.state_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| {
            fallback_home()
                .join(".local")
                .join("state")
                .join(APP_NAME)
        })
}

/// Get the log directory
///
/// Location: `$XDG_STATE_HOME/sswan/log`
pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

fn fallback_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_under_config_dir() {
        let file = config_file();
        assert!(file.starts_with(config_dir()));
        assert_eq!(file.file_name().unwrap(), "config.toml");
    }

    #[test]
    fn test_log_dir_under_state_dir() {
        assert!(log_dir().starts_with(state_dir()));
    }

    #[test]
    fn test_dirs_mention_app_name() {
        assert!(config_dir().to_string_lossy().contains(APP_NAME));
        assert!(state_dir().to_string_lossy().contains(APP_NAME));
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let dir = std::env::temp_dir().join("sswan-paths-test");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
