//! Allocatable loopback address space.

use serde::{Deserialize, Serialize};

use crate::utils::ip_utils::is_valid_ipv4;

/// A three-octet base prefix plus an inclusive range of final-octet suffixes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressRange {
    pub base: String,
    pub start: u32,
    pub end: u32,
}

impl Default for AddressRange {
    fn default() -> Self {
        Self {
            base: "127.0.0".to_string(),
            start: 10,
            end: 254,
        }
    }
}

impl AddressRange {
    pub fn new(base: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            base: base.into(),
            start,
            end,
        }
    }

    /// Permissive membership check.
    ///
    /// Accepts any address that starts with `base.` and has exactly four
    /// dot-separated components. Neither the suffix bounds nor the octet
    /// values are checked, so manually chosen addresses outside
    /// `[start, end]` but inside the same /24 are accepted.
    pub fn contains(&self, ip: &str) -> bool {
        ip.starts_with(&format!("{}.", self.base)) && ip.split('.').count() == 4
    }

    /// Strict membership check: a well-formed IPv4 address whose suffix
    /// lies within `[start, end]`.
    pub fn contains_strict(&self, ip: &str) -> bool {
        if !self.contains(ip) || !is_valid_ipv4(ip) {
            return false;
        }
        self.suffix_of(ip)
            .map_or(false, |suffix| suffix >= self.start && suffix <= self.end)
    }

    /// Render the address for suffix `n`
    pub fn format(&self, n: u32) -> String {
        format!("{}.{}", self.base, n)
    }

    /// Numeric final octet of an address inside this prefix
    pub fn suffix_of(&self, ip: &str) -> Option<u32> {
        ip.strip_prefix(&format!("{}.", self.base))?.parse().ok()
    }
}
