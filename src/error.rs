//! Error kinds surfaced by ledger, allocation and host operations.

use std::path::{Path, PathBuf};

use crate::ip::RepositoryKey;

/// Errors that can occur while managing loopback assignments
#[derive(Debug, thiserror::Error)]
pub enum LoopbackError {
    #[error("invalid IP address: {ip}")]
    InvalidAddress { ip: String },

    #[error("repository name {key:?} cannot contain whitespace or be empty")]
    InvalidKey { key: RepositoryKey },

    #[error("IP {ip} is already assigned to {owner}")]
    AddressConflict { ip: String, owner: RepositoryKey },

    #[error("no IP assignment found for {key}")]
    NotFound { key: RepositoryKey },

    #[error("no more available IPs in range {base}.{start}-{end}")]
    Exhausted { base: String, start: u32, end: u32 },

    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("host network introspection unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl LoopbackError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        LoopbackError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoopbackError>;
