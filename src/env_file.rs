//! `.env` mirroring of a repository's assigned address.
//!
//! The file keeps a single `LOOPBACK_IP=<ip>` line. An existing line is
//! rewritten in place; otherwise the line is prepended. All other lines
//! are preserved verbatim and in order.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{LoopbackError, Result};

/// Name of the environment file inside each repository
pub const ENV_FILE_NAME: &str = ".env";
/// Variable holding the assigned address
pub const LOOPBACK_IP_VAR: &str = "LOOPBACK_IP";

/// Path of the environment file for a repository directory
pub fn env_file_path(repo_path: &Path) -> PathBuf {
    repo_path.join(ENV_FILE_NAME)
}

/// Upsert `LOOPBACK_IP` in `<repo_path>/.env`, creating the file if needed.
///
/// The repository directory itself must already exist.
pub fn upsert_loopback_ip(repo_path: &Path, ip: &str) -> Result<PathBuf> {
    let path = env_file_path(repo_path);

    let existing = match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(LoopbackError::io(&path, e)),
    };

    let updated = upsert_content(existing.as_deref(), ip);
    fs::write(&path, updated).map_err(|e| LoopbackError::io(&path, e))?;
    debug!("Wrote {}={} to {}", LOOPBACK_IP_VAR, ip, path.display());
    Ok(path)
}

/// Pure upsert over file content; `None` means the file does not exist yet
pub fn upsert_content(existing: Option<&str>, ip: &str) -> String {
    let prefix = format!("{}=", LOOPBACK_IP_VAR);
    let entry = format!("{}{}", prefix, ip);

    let content = match existing {
        None | Some("") => return format!("{}\n", entry),
        Some(content) => content,
    };

    let mut found = false;
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| {
            if line.starts_with(&prefix) {
                found = true;
                entry.as_str()
            } else {
                line
            }
        })
        .collect();

    if found {
        lines.join("\n")
    } else {
        format!("{}\n{}", entry, content)
    }
}
