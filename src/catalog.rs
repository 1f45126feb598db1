//! Repository discovery.
//!
//! Repositories live two levels below the base directory as
//! `<base>/<org>/<name>`. A repository qualifies when it contains one of
//! the recognized compose file names. Hidden directories, and directories
//! whose names contain whitespace, are skipped at both levels.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Serialize;

use crate::error::{LoopbackError, Result};
use crate::ip::{AssignmentLedger, RepositoryKey};

/// File names that mark a directory as a compose project
pub const COMPOSE_FILE_NAMES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Catalog membership joined with the ledger's current assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    pub org: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl RepositoryDescriptor {
    pub fn key(&self) -> RepositoryKey {
        RepositoryKey::new(self.org.clone(), self.name.clone())
    }
}

/// Scans a base directory for compose projects
#[derive(Debug, Clone)]
pub struct RepositoryCatalog {
    base_dir: PathBuf,
}

impl RepositoryCatalog {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Working directory of a repository
    pub fn repo_path(&self, key: &RepositoryKey) -> PathBuf {
        self.base_dir.join(&key.org).join(&key.name)
    }

    /// All qualifying repositories, sorted by organization then name.
    ///
    /// A missing base directory yields an empty catalog.
    pub fn scan(&self) -> Result<Vec<RepositoryKey>> {
        let orgs = match visible_subdirs(&self.base_dir) {
            Ok(orgs) => orgs,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Base directory {} does not exist", self.base_dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(LoopbackError::io(&self.base_dir, e)),
        };

        let mut repos = Vec::new();
        for (org, org_path) in orgs {
            let entries = match visible_subdirs(&org_path) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping {}: {}", org_path.display(), e);
                    continue;
                }
            };

            for (name, repo_path) in entries {
                if has_compose_file(&repo_path) {
                    repos.push(RepositoryKey::new(org.clone(), name));
                } else {
                    debug!("No compose file in {}", repo_path.display());
                }
            }
        }

        repos.sort();
        Ok(repos)
    }

    /// Every repository with its current assignment, recomputed on each call
    pub fn descriptors(&self, ledger: &AssignmentLedger) -> Result<Vec<RepositoryDescriptor>> {
        Ok(self
            .scan()?
            .into_iter()
            .map(|key| {
                let ip = ledger.get(&key).map(str::to_string);
                RepositoryDescriptor {
                    org: key.org,
                    name: key.name,
                    ip,
                }
            })
            .collect())
    }

    /// Repositories in catalog order that have no ledger entry
    pub fn unassigned(&self, ledger: &AssignmentLedger) -> Result<Vec<RepositoryKey>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|key| ledger.get(key).is_none())
            .collect())
    }
}

/// Check whether a directory contains a recognized compose file
pub fn has_compose_file(path: &Path) -> bool {
    COMPOSE_FILE_NAMES
        .iter()
        .any(|file| path.join(file).is_file())
}

/// Non-hidden subdirectories with UTF-8, whitespace-free names
fn visible_subdirs(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if name.starts_with('.') => {}
            Ok(name) if name.chars().any(char::is_whitespace) => {
                warn!("Skipping {}: ledger records cannot hold names with whitespace", path.display())
            }
            Ok(name) => dirs.push((name, path)),
            Err(raw) => warn!("Skipping non UTF-8 directory name {:?}", raw),
        }
    }
    Ok(dirs)
}
