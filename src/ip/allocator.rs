//! IP address allocation logic.
//!
//! Pure functions: nothing here touches the ledger or the filesystem. The
//! same batch plan drives both the dry-run preview and the executed
//! auto-assignment, so the preview always matches what gets committed.

use std::collections::HashSet;

use log::debug;
use serde::Serialize;

use super::ledger::RepositoryKey;
use super::range::AddressRange;
use crate::error::{LoopbackError, Result};

/// One would-be assignment produced by batch planning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAssignment {
    #[serde(flatten)]
    pub key: RepositoryKey,
    pub ip: String,
}

/// Ordered allocations for a batch, cut short where the range ran out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub allocations: Vec<PlannedAssignment>,
    /// First repository that could not be given an address
    pub exhausted_at: Option<RepositoryKey>,
}

fn exhausted(range: &AddressRange) -> LoopbackError {
    LoopbackError::Exhausted {
        base: range.base.clone(),
        start: range.start,
        end: range.end,
    }
}

fn next_free_suffix(range: &AddressRange, used: &HashSet<String>, start_hint: u32) -> Option<u32> {
    (start_hint..=range.end).find(|&n| !used.contains(&range.format(n)))
}

/// First address at or after `start_hint` (inclusive, up to `range.end`)
/// that is not in `used`.
pub fn next_available(range: &AddressRange, used: &HashSet<String>, start_hint: u32) -> Result<String> {
    next_free_suffix(range, used, start_hint)
        .map(|n| range.format(n))
        .ok_or_else(|| exhausted(range))
}

/// Plan addresses for `keys` in the given order.
///
/// The hint moves to the suffix after each allocation, so no two keys in
/// one batch are offered the same candidate and lower suffixes that were
/// already rejected are not scanned again.
pub fn plan_batch(range: &AddressRange, used: &HashSet<String>, keys: &[RepositoryKey]) -> BatchPlan {
    let mut used = used.clone();
    let mut hint = range.start;
    let mut plan = BatchPlan::default();

    for key in keys {
        match next_free_suffix(range, &used, hint) {
            Some(n) => {
                let ip = range.format(n);
                debug!("Planned {} for {}", ip, key);
                used.insert(ip.clone());
                hint = n.saturating_add(1);
                plan.allocations.push(PlannedAssignment { key: key.clone(), ip });
            }
            None => {
                plan.exhausted_at = Some(key.clone());
                break;
            }
        }
    }

    plan
}

impl BatchPlan {
    /// Error to report when the plan stopped early
    pub fn exhaustion_error(&self, range: &AddressRange) -> Option<LoopbackError> {
        self.exhausted_at.as_ref().map(|_| exhausted(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn used(ips: &[&str]) -> HashSet<String> {
        ips.iter().map(|s| s.to_string()).collect()
    }

    fn keys(names: &[&str]) -> Vec<RepositoryKey> {
        names.iter().map(|n| RepositoryKey::new("acme", *n)).collect()
    }

    #[test]
    fn test_next_available_skips_used() {
        let range = AddressRange::new("127.0.0", 10, 20);
        let ip = next_available(&range, &used(&["127.0.0.10", "127.0.0.11"]), 10).unwrap();
        assert_eq!(ip, "127.0.0.12");
    }

    #[test]
    fn test_next_available_honours_hint() {
        let range = AddressRange::new("127.0.0", 10, 20);
        assert_eq!(next_available(&range, &used(&[]), 15).unwrap(), "127.0.0.15");
    }

    #[test]
    fn test_next_available_includes_end() {
        let range = AddressRange::new("127.0.0", 10, 11);
        assert_eq!(next_available(&range, &used(&["127.0.0.10"]), 10).unwrap(), "127.0.0.11");
    }

    #[test]
    fn test_next_available_exhausted() {
        let range = AddressRange::new("127.0.0", 10, 10);
        let err = next_available(&range, &used(&["127.0.0.10"]), 10).unwrap_err();
        assert!(matches!(err, LoopbackError::Exhausted { start: 10, end: 10, .. }));
    }

    #[test]
    fn test_plan_batch_is_increasing_and_skips_used() {
        let range = AddressRange::new("127.0.0", 10, 20);
        let plan = plan_batch(&range, &used(&["127.0.0.11", "127.0.0.13"]), &keys(&["a", "b", "c"]));

        let ips: Vec<&str> = plan.allocations.iter().map(|p| p.ip.as_str()).collect();
        assert_eq!(ips, vec!["127.0.0.10", "127.0.0.12", "127.0.0.14"]);
        assert!(plan.exhausted_at.is_none());
        assert!(plan.exhaustion_error(&range).is_none());
    }

    #[test]
    fn test_plan_batch_stops_at_exhaustion() {
        let range = AddressRange::new("127.0.0", 10, 11);
        let plan = plan_batch(&range, &used(&[]), &keys(&["a", "b", "c", "d"]));

        assert_eq!(plan.allocations.len(), 2);
        assert_eq!(plan.exhausted_at, Some(RepositoryKey::new("acme", "c")));
        assert!(matches!(plan.exhaustion_error(&range), Some(LoopbackError::Exhausted { .. })));
    }

    #[test]
    fn test_plan_batch_does_not_mutate_input() {
        let range = AddressRange::new("127.0.0", 10, 12);
        let before = used(&["127.0.0.12"]);
        let _ = plan_batch(&range, &before, &keys(&["a", "b"]));
        assert_eq!(before, used(&["127.0.0.12"]));
    }
}
