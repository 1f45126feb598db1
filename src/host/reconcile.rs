//! Ledger versus host comparison.
//!
//! Read-only: produces a report of assigned addresses the host does not
//! have configured, plus commands an operator can run to add them.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::LoopbackAddress;
use crate::ip::{AssignmentLedger, RepositoryKey};

/// An assigned address absent from the host, with every repository holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingAddress {
    pub ip: String,
    pub owners: Vec<RepositoryKey>,
}

/// Commands that add the missing aliases to the loopback interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remediation {
    /// NetworkManager commands, ending with the command that applies them
    pub nmcli: Vec<String>,
    /// Direct `ip addr add` alternative, one per address
    pub ip_commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub assigned_count: usize,
    pub host_configured_count: usize,
    pub missing: Vec<MissingAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Compare ledger assignments with the host's configured aliases
pub fn reconcile(ledger: &AssignmentLedger, host_addresses: &[LoopbackAddress]) -> ReconciliationReport {
    let host_set: HashSet<&str> = host_addresses.iter().map(|a| a.ip.as_str()).collect();

    let mut missing: BTreeMap<String, Vec<RepositoryKey>> = BTreeMap::new();
    for (key, ip) in ledger.iter() {
        if !host_set.contains(ip) {
            missing.entry(ip.to_string()).or_default().push(key.clone());
        }
    }

    let missing: Vec<MissingAddress> = missing
        .into_iter()
        .map(|(ip, owners)| MissingAddress { ip, owners })
        .collect();

    let remediation = if missing.is_empty() {
        None
    } else {
        let ips: Vec<String> = missing.iter().map(|m| m.ip.clone()).collect();
        Some(Remediation {
            nmcli: nmcli_commands(&ips),
            ip_commands: ip_addr_commands(&ips),
        })
    };

    ReconciliationReport {
        assigned_count: ledger.len(),
        host_configured_count: host_addresses.len(),
        missing,
        remediation,
    }
}

/// One `nmcli` modify per address plus a trailing `connection up`
pub fn nmcli_commands(ips: &[String]) -> Vec<String> {
    let mut commands: Vec<String> = ips
        .iter()
        .map(|ip| format!("sudo nmcli connection modify lo +ipv4.addresses {}/32", ip))
        .collect();
    if !commands.is_empty() {
        commands.push("sudo nmcli connection up lo".to_string());
    }
    commands
}

/// `ip addr add` per address
pub fn ip_addr_commands(ips: &[String]) -> Vec<String> {
    ips.iter()
        .map(|ip| format!("sudo ip addr add {}/8 dev lo", ip))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn host(ips: &[&str]) -> Vec<LoopbackAddress> {
        ips.iter()
            .map(|ip| LoopbackAddress {
                interface: "lo".to_string(),
                ip: ip.to_string(),
                netmask: None,
            })
            .collect()
    }

    fn ledger_from(dir: &TempDir, content: &str) -> AssignmentLedger {
        let path = dir.path().join("assignments.txt");
        fs::write(&path, content).unwrap();
        AssignmentLedger::load(&path).unwrap()
    }

    #[test]
    fn test_reports_single_missing_address() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_from(&dir, "acme p1 127.0.0.11\nacme p2 127.0.0.12\n");

        let report = reconcile(&ledger, &host(&["127.0.0.11"]));
        assert_eq!(report.assigned_count, 2);
        assert_eq!(report.host_configured_count, 1);
        assert_eq!(
            report.missing,
            vec![MissingAddress {
                ip: "127.0.0.12".to_string(),
                owners: vec![RepositoryKey::new("acme", "p2")],
            }]
        );

        let remediation = report.remediation.unwrap();
        assert_eq!(
            remediation.nmcli,
            vec![
                "sudo nmcli connection modify lo +ipv4.addresses 127.0.0.12/32".to_string(),
                "sudo nmcli connection up lo".to_string(),
            ]
        );
        assert_eq!(remediation.ip_commands, vec!["sudo ip addr add 127.0.0.12/8 dev lo".to_string()]);
    }

    #[test]
    fn test_consistent_has_no_remediation() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_from(&dir, "acme p1 127.0.0.11\n");

        let report = reconcile(&ledger, &host(&["127.0.0.11", "127.0.0.50"]));
        assert!(report.is_consistent());
        assert!(report.remediation.is_none());
        assert_eq!(report.host_configured_count, 2);
    }

    #[test]
    fn test_missing_is_sorted_distinct_with_all_owners() {
        let dir = TempDir::new().unwrap();
        let ledger = ledger_from(&dir, "b y 127.0.0.20\na x 127.0.0.20\nc z 127.0.0.15\n");

        let report = reconcile(&ledger, &[]);
        let ips: Vec<&str> = report.missing.iter().map(|m| m.ip.as_str()).collect();
        assert_eq!(ips, vec!["127.0.0.15", "127.0.0.20"]);
        assert_eq!(report.missing[1].owners.len(), 2);
        assert_eq!(report.remediation.unwrap().nmcli.len(), 3);
    }

    #[test]
    fn test_command_templates_empty_input() {
        assert!(nmcli_commands(&[]).is_empty());
        assert!(ip_addr_commands(&[]).is_empty());
    }
}
