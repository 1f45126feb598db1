//! Text and JSON rendering of command results.
//!
//! Every renderer returns a `String` so the binary only has to print it.

use std::collections::BTreeMap;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use crate::catalog::RepositoryDescriptor;
use crate::host::{LoopbackAddress, ReconciliationReport};
use crate::ip::RepositoryKey;
use crate::orchestrator::{AssignOutcome, AutoAssignReport};

/// Pretty-printed JSON followed by a newline
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")?;
    json.push('\n');
    Ok(json)
}

/// Fixed-width table of repositories and their assignment status
pub fn render_repository_table(repos: &[RepositoryDescriptor]) -> String {
    if repos.is_empty() {
        return "No repositories found.\n".to_string();
    }

    let mut lines = vec![
        format!("{:<30} {:<15} {}", "Repository", "IP Address", "Status"),
        "-".repeat(60),
    ];
    for repo in repos {
        let (ip, status) = match &repo.ip {
            Some(ip) => (ip.as_str(), "✓ Assigned"),
            None => ("-", "✗ Not assigned"),
        };
        lines.push(format!(
            "{:<30} {:<15} {}",
            format!("{}/{}", repo.org, repo.name),
            ip,
            status
        ));
    }
    lines.join("\n") + "\n"
}

/// Listing of repositories that still need an address
pub fn render_unassigned(repos: &[RepositoryDescriptor]) -> String {
    if repos.is_empty() {
        return "All repositories have IP assignments.\n".to_string();
    }

    let mut lines = vec![format!("Found {} unassigned repositories:", repos.len()), String::new()];
    for repo in repos {
        lines.push(format!("  - {}/{}", repo.org, repo.name));
    }
    lines.push(String::new());
    lines.push("Run 'loopback-manager auto-assign' to assign IPs automatically.".to_string());
    lines.join("\n") + "\n"
}

pub fn render_assign(outcome: &AssignOutcome) -> String {
    if outcome.changed() {
        format!("Assigned {} to {}\n", outcome.ip, outcome.key)
    } else {
        format!("{} already assigned to {}\n", outcome.ip, outcome.key)
    }
}

pub fn render_remove(key: &RepositoryKey, ip: &str) -> String {
    format!("Removed IP assignment {} for {}\n", ip, key)
}

/// Dry-run preview or execution summary of an auto-assign run
pub fn render_auto_assign(report: &AutoAssignReport) -> String {
    if report.planned.is_empty() && report.failure.is_none() {
        return "All repositories already have IP assignments.\n".to_string();
    }

    let mut lines = vec![format!("Found {} unassigned repositories:", report.unassigned), String::new()];
    if report.executed {
        for outcome in &report.committed {
            lines.push(format!("  Assigned {} to {}", outcome.ip, outcome.key));
            if let Some(warning) = &outcome.env_warning {
                lines.push(format!("    Warning: could not update .env file: {}", warning));
            }
        }
        lines.push(String::new());
        if report.failure.is_none() {
            lines.push(format!("Assigned {} IPs.", report.committed.len()));
        } else {
            lines.push(format!(
                "Stopped after {} of {} planned assignments.",
                report.committed.len(),
                report.planned.len()
            ));
        }
    } else {
        lines.push("DRY RUN MODE - No changes will be made".to_string());
        lines.push("To execute, run with --execute flag".to_string());
        lines.push(String::new());
        for planned in &report.planned {
            lines.push(format!("  Would assign {} to {}", planned.ip, planned.key));
        }
        lines.push(String::new());
        lines.push(format!("DRY RUN COMPLETE - Would assign {} IPs", report.planned.len()));
        lines.push("To execute these assignments, run: loopback-manager auto-assign --execute".to_string());
    }
    lines.join("\n") + "\n"
}

pub fn render_duplicates(duplicates: &BTreeMap<String, Vec<RepositoryKey>>) -> String {
    if duplicates.is_empty() {
        return "No duplicate IPs found.\n".to_string();
    }

    let mut lines = Vec::new();
    for (ip, owners) in duplicates {
        lines.push(format!("Duplicate IP {} assigned to:", ip));
        for owner in owners {
            lines.push(format!("  - {}", owner));
        }
    }
    lines.join("\n") + "\n"
}

pub fn render_host_addresses(addresses: &[LoopbackAddress]) -> String {
    if addresses.is_empty() {
        return "No additional loopback addresses configured on host.\n\
                (127.0.0.1 is excluded as it's the default loopback)\n"
            .to_string();
    }

    let mut lines = vec![
        "Host Loopback Addresses:".to_string(),
        format!("{:<20} {}", "Interface", "IP Address"),
        "-".repeat(40),
    ];
    for addr in addresses {
        lines.push(format!("{:<20} {}", addr.interface, addr.ip));
    }
    lines.join("\n") + "\n"
}

pub fn render_reconciliation(report: &ReconciliationReport) -> String {
    let mut lines = vec![
        "=== Loopback Address Consistency Check ===".to_string(),
        String::new(),
        format!("Assigned addresses in config: {}", report.assigned_count),
        format!("Loopback addresses on host:   {}", report.host_configured_count),
        String::new(),
    ];

    if report.is_consistent() {
        lines.push("✓ All assigned IP addresses are configured on the host.".to_string());
        return lines.join("\n") + "\n";
    }

    lines.push(format!(
        "⚠ Found {} assigned IP addresses not configured on host:",
        report.missing.len()
    ));
    lines.push(String::new());
    for missing in &report.missing {
        let owners: Vec<String> = missing.owners.iter().map(ToString::to_string).collect();
        lines.push(format!("  {} (assigned to {})", missing.ip, owners.join(", ")));
    }

    if let Some(remediation) = &report.remediation {
        lines.push(String::new());
        lines.push("=== Configuration Commands ===".to_string());
        lines.push(String::new());
        lines.push("Using NetworkManager (if available):".to_string());
        lines.extend(remediation.nmcli.iter().map(|cmd| format!("  {}", cmd)));
        lines.push(String::new());
        lines.push("Alternatively, using ip command directly:".to_string());
        lines.extend(remediation.ip_commands.iter().map(|cmd| format!("  {}", cmd)));
        lines.push(String::new());
        lines.push("Note: These changes may not persist after reboot without proper configuration.".to_string());
    }

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoopbackError;
    use crate::host::{MissingAddress, Remediation};
    use crate::ip::PlannedAssignment;

    fn repo(org: &str, name: &str, ip: Option<&str>) -> RepositoryDescriptor {
        RepositoryDescriptor {
            org: org.to_string(),
            name: name.to_string(),
            ip: ip.map(str::to_string),
        }
    }

    #[test]
    fn test_repository_table() {
        let out = render_repository_table(&[repo("acme", "a", Some("127.0.0.10")), repo("acme", "b", None)]);
        assert!(out.starts_with("Repository"));
        assert!(out.contains("acme/a"));
        assert!(out.contains("127.0.0.10"));
        assert!(out.contains("✗ Not assigned"));
        assert_eq!(render_repository_table(&[]), "No repositories found.\n");
    }

    #[test]
    fn test_json_omits_missing_ip() {
        let json = to_json(&[repo("acme", "a", None)]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["org"], "acme");
        assert!(value[0].get("ip").is_none());
    }

    #[test]
    fn test_dry_run_preview() {
        let report = AutoAssignReport {
            executed: false,
            unassigned: 1,
            planned: vec![PlannedAssignment {
                key: RepositoryKey::new("acme", "a"),
                ip: "127.0.0.10".to_string(),
            }],
            committed: Vec::new(),
            failure: None,
        };
        let out = render_auto_assign(&report);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Found 1 unassigned repositories:");
        assert_eq!(lines[2], "DRY RUN MODE - No changes will be made");
        assert_eq!(lines[3], "To execute, run with --execute flag");
        assert!(out.contains("Would assign 127.0.0.10 to acme/a"));
    }

    #[test]
    fn test_execute_summary_has_header() {
        let key = RepositoryKey::new("acme", "a");
        let report = AutoAssignReport {
            executed: true,
            unassigned: 2,
            planned: vec![PlannedAssignment {
                key: key.clone(),
                ip: "127.0.0.10".to_string(),
            }],
            committed: vec![AssignOutcome {
                key,
                ip: "127.0.0.10".to_string(),
                previous: None,
                env_file: None,
                env_warning: None,
            }],
            failure: Some(LoopbackError::Exhausted {
                base: "127.0.0".to_string(),
                start: 10,
                end: 10,
            }),
        };
        let out = render_auto_assign(&report);
        assert!(out.starts_with("Found 2 unassigned repositories:\n\n"));
        assert!(!out.contains("--execute"));
        assert!(out.contains("Stopped after 1 of 1 planned assignments."));
    }

    #[test]
    fn test_duplicates_report() {
        let mut dups = BTreeMap::new();
        dups.insert(
            "127.0.0.10".to_string(),
            vec![RepositoryKey::new("a", "x"), RepositoryKey::new("b", "y")],
        );
        let out = render_duplicates(&dups);
        assert!(out.contains("Duplicate IP 127.0.0.10 assigned to:"));
        assert!(out.contains("  - b/y"));
        assert_eq!(render_duplicates(&BTreeMap::new()), "No duplicate IPs found.\n");
    }

    #[test]
    fn test_reconciliation_report_lists_commands() {
        let report = ReconciliationReport {
            assigned_count: 2,
            host_configured_count: 1,
            missing: vec![MissingAddress {
                ip: "127.0.0.12".to_string(),
                owners: vec![RepositoryKey::new("acme", "p2")],
            }],
            remediation: Some(Remediation {
                nmcli: vec!["sudo nmcli connection up lo".to_string()],
                ip_commands: vec!["sudo ip addr add 127.0.0.12/8 dev lo".to_string()],
            }),
        };
        let out = render_reconciliation(&report);
        assert!(out.contains("127.0.0.12 (assigned to acme/p2)"));
        assert!(out.contains("  sudo ip addr add 127.0.0.12/8 dev lo"));
    }
}
