use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ip::AddressRange;

/// Default root under which `<org>/<repo>` directories live
pub const DEFAULT_BASE_DIR: &str = "~/github";

/// Top-level configuration that mirrors the YAML configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory containing organization directories
    pub base_dir: PathBuf,
    /// Allocatable loopback range
    pub ip_range: AddressRange,
    /// Ledger file location; defaults to the per-user config directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
    /// Require assigned addresses to be well-formed and inside `[start, end]`
    pub strict_validation: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            ip_range: AddressRange::default(),
            data_file: None,
            strict_validation: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(ValidationError::InvalidBaseDir(
                "base_dir cannot be empty".to_string(),
            ));
        }

        let octets: Vec<&str> = self.ip_range.base.split('.').collect();
        if octets.len() != 3 || !octets.iter().all(|o| o.parse::<u8>().is_ok()) {
            return Err(ValidationError::InvalidRange(format!(
                "base '{}' must be three dot-separated octets (e.g. 127.0.0)",
                self.ip_range.base
            )));
        }

        if self.ip_range.start > self.ip_range.end {
            return Err(ValidationError::InvalidRange(format!(
                "start ({}) is greater than end ({})",
                self.ip_range.start, self.ip_range.end
            )));
        }

        if self.ip_range.end > 255 {
            return Err(ValidationError::InvalidRange(format!(
                "end ({}) exceeds 255",
                self.ip_range.end
            )));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid base directory: {0}")]
    InvalidBaseDir(String),
    #[error("Invalid ip_range: {0}")]
    InvalidRange(String),
}
