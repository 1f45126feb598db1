//! Persisted assignment ledger.
//!
//! Maps each repository to the loopback address it owns and keeps that
//! mapping mirrored in a flat text file, one `org name ip` record per line.
//! Every mutation is written through to disk immediately.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{LoopbackError, Result};

/// Structured repository identity: organization directory plus repository directory
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepositoryKey {
    pub org: String,
    pub name: String,
}

impl RepositoryKey {
    pub fn new(org: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            name: name.into(),
        }
    }

    /// Whether the key survives the whitespace-separated ledger format
    pub fn is_storable(&self) -> bool {
        [&self.org, &self.name]
            .iter()
            .all(|field| !field.is_empty() && !field.chars().any(char::is_whitespace))
    }
}

impl fmt::Display for RepositoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.org, self.name)
    }
}

/// In-memory assignment table backed by a ledger file
#[derive(Debug)]
pub struct AssignmentLedger {
    path: PathBuf,
    assignments: BTreeMap<RepositoryKey, String>,
}

impl AssignmentLedger {
    /// Empty ledger that will be written to `path` on the first mutation
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            assignments: BTreeMap::new(),
        }
    }

    /// Load the ledger from `path`. A missing file yields an empty ledger.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No ledger at {}, starting empty", path.display());
                return Ok(Self::empty(path));
            }
            Err(e) => return Err(LoopbackError::io(path, e)),
        };

        let assignments = parse_records(&content);
        debug!("Loaded {} assignments from {}", assignments.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            assignments,
        })
    }

    /// Rewrite the whole ledger file, creating its parent directory if needed
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| LoopbackError::io(parent, e))?;
            }
        }
        fs::write(&self.path, self.render()).map_err(|e| LoopbackError::io(&self.path, e))
    }

    /// Serialized form: `org name ip` lines in lexicographic order
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .assignments
            .iter()
            .map(|(key, ip)| format!("{} {} {}", key.org, key.name, ip))
            .collect();
        lines.sort();

        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RepositoryKey, &str)> {
        self.assignments.iter().map(|(k, ip)| (k, ip.as_str()))
    }

    pub fn get(&self, key: &RepositoryKey) -> Option<&str> {
        self.assignments.get(key).map(String::as_str)
    }

    /// First owner of `ip` in key order. Use [`owners_of`](Self::owners_of)
    /// when duplicates matter.
    pub fn find_by_ip(&self, ip: &str) -> Option<&RepositoryKey> {
        self.assignments
            .iter()
            .find(|(_, assigned)| assigned.as_str() == ip)
            .map(|(key, _)| key)
    }

    /// Every repository holding `ip`
    pub fn owners_of(&self, ip: &str) -> Vec<&RepositoryKey> {
        self.assignments
            .iter()
            .filter(|(_, assigned)| assigned.as_str() == ip)
            .map(|(key, _)| key)
            .collect()
    }

    /// Insert or overwrite an assignment and persist. Callers validate first.
    ///
    /// If the write fails the in-memory table is restored.
    pub fn set(&mut self, key: RepositoryKey, ip: impl Into<String>) -> Result<()> {
        let previous = self.assignments.insert(key.clone(), ip.into());
        if let Err(e) = self.save() {
            match previous {
                Some(old) => self.assignments.insert(key, old),
                None => self.assignments.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Delete an assignment and persist, returning the address it held
    pub fn remove(&mut self, key: &RepositoryKey) -> Result<String> {
        let ip = self
            .assignments
            .remove(key)
            .ok_or_else(|| LoopbackError::NotFound { key: key.clone() })?;
        if let Err(e) = self.save() {
            self.assignments.insert(key.clone(), ip);
            return Err(e);
        }
        Ok(ip)
    }

    /// Snapshot of every assigned address
    pub fn all_used_ips(&self) -> HashSet<String> {
        self.assignments.values().cloned().collect()
    }

    /// Addresses held by two or more repositories, with all of their owners
    pub fn duplicates(&self) -> BTreeMap<String, Vec<RepositoryKey>> {
        let mut by_ip: BTreeMap<String, Vec<RepositoryKey>> = BTreeMap::new();
        for (key, ip) in &self.assignments {
            by_ip.entry(ip.clone()).or_default().push(key.clone());
        }
        by_ip.retain(|_, owners| owners.len() > 1);
        by_ip
    }
}

/// Parse ledger text, skipping blanks, `#` comments and lines that are not
/// exactly three whitespace-separated fields
fn parse_records(content: &str) -> BTreeMap<RepositoryKey, String> {
    let mut assignments = BTreeMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [org, name, ip] => {
                assignments.insert(RepositoryKey::new(*org, *name), ip.to_string());
            }
            _ => debug!("Skipping malformed ledger line: {:?}", line),
        }
    }
    assignments
}
