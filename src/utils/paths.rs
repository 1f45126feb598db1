//! Per-user path resolution.
//!
//! Configuration and the assignment ledger live under
//! `~/.config/loopback-manager/`. Paths given in configuration may start
//! with `~`, which is expanded to the user's home directory.

use std::env;
use std::path::{Path, PathBuf};

/// Directory under `~/.config` holding this tool's files
const APP_CONFIG_DIR: &str = ".config/loopback-manager";

/// Errors that can occur during path resolution
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Cannot determine home directory")]
    NoHomeDir,
}

/// Get the user's home directory from the HOME environment variable
fn home_dir() -> Result<PathBuf, PathError> {
    env::var("HOME")
        .ok()
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .ok_or(PathError::NoHomeDir)
}

/// Expand a leading `~` or `~/` against the home directory.
///
/// Other paths (including `~user/...`) are returned unchanged.
pub fn expand_tilde(path: &Path) -> Result<PathBuf, PathError> {
    match path.to_str() {
        Some("~") => home_dir(),
        Some(s) if s.starts_with("~/") => Ok(home_dir()?.join(&s[2..])),
        _ => Ok(path.to_path_buf()),
    }
}

/// `~/.config/loopback-manager`
fn config_dir() -> Result<PathBuf, PathError> {
    Ok(home_dir()?.join(APP_CONFIG_DIR))
}

/// `~/.config/loopback-manager/config.yaml`
pub fn default_config_path() -> Result<PathBuf, PathError> {
    Ok(config_dir()?.join("config.yaml"))
}

/// `~/.config/loopback-manager/assignments.txt`
pub fn default_ledger_path() -> Result<PathBuf, PathError> {
    Ok(config_dir()?.join("assignments.txt"))
}
