//! Assignment orchestrator.
//!
//! This module coordinates one command invocation: it owns the loaded
//! configuration, the assignment ledger and the repository catalog, and
//! runs the assignment workflow over them. The ledger is authoritative;
//! `.env` files are a best-effort mirror written after each commit.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{debug, info, warn};
use serde::Serialize;

use crate::catalog::{RepositoryCatalog, RepositoryDescriptor};
use crate::config::Config;
use crate::env_file::upsert_loopback_ip;
use crate::error::{LoopbackError, Result};
use crate::host::{reconcile, HostNetwork, LoopbackAddress, ReconciliationReport};
use crate::ip::{next_available, plan_batch, AssignmentLedger, PlannedAssignment, RepositoryKey};

/// Result of a committed assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignOutcome {
    pub key: RepositoryKey,
    pub ip: String,
    /// Address held before this call, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// `.env` file that was updated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_file: Option<PathBuf>,
    /// Why the `.env` update failed; the ledger commit stands regardless
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_warning: Option<String>,
}

impl AssignOutcome {
    pub fn changed(&self) -> bool {
        self.previous.as_deref() != Some(self.ip.as_str())
    }
}

/// Result of an auto-assign run
#[derive(Debug)]
pub struct AutoAssignReport {
    pub executed: bool,
    /// Repositories without an assignment when the run started
    pub unassigned: usize,
    /// Every allocation the plan produced, in catalog order
    pub planned: Vec<PlannedAssignment>,
    /// Assignments committed before the run finished or stopped
    pub committed: Vec<AssignOutcome>,
    /// Error that stopped the batch; earlier commits are kept
    pub failure: Option<LoopbackError>,
}

impl AutoAssignReport {
    /// Turn a stopped batch into its error
    pub fn into_result(self) -> Result<Self> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// Owns the per-invocation state and runs commands against it
#[derive(Debug)]
pub struct Orchestrator {
    config: Config,
    ledger: AssignmentLedger,
    catalog: RepositoryCatalog,
}

impl Orchestrator {
    pub fn new(config: Config, ledger: AssignmentLedger) -> Self {
        let catalog = RepositoryCatalog::new(config.base_dir.clone());
        Self {
            config,
            ledger,
            catalog,
        }
    }

    pub fn ledger(&self) -> &AssignmentLedger {
        &self.ledger
    }

    /// All compose projects with their assignments
    pub fn list(&self) -> Result<Vec<RepositoryDescriptor>> {
        self.catalog.descriptors(&self.ledger)
    }

    /// Compose projects without an assignment
    pub fn scan(&self) -> Result<Vec<RepositoryDescriptor>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|repo| repo.ip.is_none())
            .collect())
    }

    fn is_valid_address(&self, ip: &str) -> bool {
        if self.config.strict_validation {
            self.config.ip_range.contains_strict(ip)
        } else {
            self.config.ip_range.contains(ip)
        }
    }

    /// Assign an address to a repository and persist it.
    ///
    /// With no requested address the lowest free one in the range is used.
    /// Re-assigning the address a repository already holds is a no-op
    /// success. A failed `.env` update is reported in the outcome, not as
    /// an error.
    pub fn assign(&mut self, org: &str, name: &str, requested: Option<&str>) -> Result<AssignOutcome> {
        let key = RepositoryKey::new(org, name);
        if !key.is_storable() {
            return Err(LoopbackError::InvalidKey { key });
        }
        let range = &self.config.ip_range;

        let ip = match requested.filter(|ip| !ip.is_empty()) {
            Some(ip) => ip.to_string(),
            None => next_available(range, &self.ledger.all_used_ips(), range.start)?,
        };

        if !self.is_valid_address(&ip) {
            return Err(LoopbackError::InvalidAddress { ip });
        }

        if let Some(owner) = self.ledger.owners_of(&ip).into_iter().find(|owner| **owner != key) {
            return Err(LoopbackError::AddressConflict {
                ip,
                owner: owner.clone(),
            });
        }

        let previous = self.ledger.get(&key).map(str::to_string);
        self.ledger.set(key.clone(), ip.clone())?;
        info!("Assigned {} to {}", ip, key);

        let repo_path = self.catalog.repo_path(&key);
        let (env_file, env_warning) = match upsert_loopback_ip(&repo_path, &ip) {
            Ok(path) => (Some(path), None),
            Err(e) => {
                warn!("Could not update .env file for {}: {}", key, e);
                (None, Some(e.to_string()))
            }
        };

        Ok(AssignOutcome {
            key,
            ip,
            previous,
            env_file,
            env_warning,
        })
    }

    /// Delete a repository's assignment, returning the released address
    pub fn remove(&mut self, org: &str, name: &str) -> Result<String> {
        let key = RepositoryKey::new(org, name);
        let ip = self.ledger.remove(&key)?;
        info!("Removed {} from {}", ip, key);
        Ok(ip)
    }

    /// Assign addresses to every unassigned repository.
    ///
    /// Without `execute` only the plan is returned and nothing is written.
    /// With `execute` each planned assignment is committed in order; the
    /// first failure stops the batch and is returned in the report.
    pub fn auto_assign(&mut self, execute: bool) -> Result<AutoAssignReport> {
        let unassigned = self.catalog.unassigned(&self.ledger)?;
        let range = self.config.ip_range.clone();
        let plan = plan_batch(&range, &self.ledger.all_used_ips(), &unassigned);
        debug!(
            "Planned {} of {} unassigned repositories",
            plan.allocations.len(),
            unassigned.len()
        );

        let mut report = AutoAssignReport {
            executed: execute,
            unassigned: unassigned.len(),
            planned: plan.allocations.clone(),
            committed: Vec::new(),
            failure: None,
        };

        if execute {
            for planned in &plan.allocations {
                match self.assign(&planned.key.org, &planned.key.name, Some(&planned.ip)) {
                    Ok(outcome) => report.committed.push(outcome),
                    Err(e) => {
                        report.failure = Some(e);
                        return Ok(report);
                    }
                }
            }
        }

        report.failure = plan.exhaustion_error(&range);
        Ok(report)
    }

    /// Addresses held by more than one repository
    pub fn duplicates(&self) -> BTreeMap<String, Vec<RepositoryKey>> {
        self.ledger.duplicates()
    }

    /// Host-reported loopback aliases
    pub fn host_addresses(&self, host: &impl HostNetwork) -> Result<Vec<LoopbackAddress>> {
        host.loopback_addresses()
    }

    /// Compare the ledger with the host's configured aliases
    pub fn sync_check(&self, host: &impl HostNetwork) -> Result<ReconciliationReport> {
        let addresses = host.loopback_addresses()?;
        Ok(reconcile(&self.ledger, &addresses))
    }
}
