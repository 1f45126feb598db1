//! Host network introspection and reconciliation.
//!
//! The ledger says which loopback aliases *should* exist; the host says
//! which ones *do*. [`HostNetwork`] abstracts the platform query so the
//! reconciliation logic can run against any address list.

pub mod introspect;
pub mod reconcile;

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use introspect::{parse_ifconfig_output, parse_ip_addr_output, SystemHost};
pub use reconcile::{
    ip_addr_commands, nmcli_commands, reconcile, MissingAddress, ReconciliationReport, Remediation,
};

/// One loopback alias configured on the host. `127.0.0.1` is never reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopbackAddress {
    pub interface: String,
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
}

/// Source of the host's currently configured loopback aliases
pub trait HostNetwork {
    fn loopback_addresses(&self) -> Result<Vec<LoopbackAddress>>;
}

/// Fixed address list, for callers that already hold the host state
impl HostNetwork for Vec<LoopbackAddress> {
    fn loopback_addresses(&self) -> Result<Vec<LoopbackAddress>> {
        Ok(self.clone())
    }
}
