//! Platform queries for configured loopback aliases.
//!
//! Linux is queried with `ip addr show lo`, macOS with `ifconfig lo0`.
//! The calls block until the command exits; there is no timeout or retry.

use std::process::Command;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::{HostNetwork, LoopbackAddress};
use crate::error::{LoopbackError, Result};
use crate::utils::ip_utils::is_additional_loopback;

static LINUX_INET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^inet\s+(?P<cidr>(?P<ip>\d+\.\d+\.\d+\.\d+)(?:/\d+)?)").unwrap()
});

static DARWIN_INET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^inet\s+(?P<ip>\d+\.\d+\.\d+\.\d+)(?:\s+netmask\s+(?P<mask>\S+))?").unwrap()
});

/// Queries the running host with its native networking tools
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostNetwork for SystemHost {
    fn loopback_addresses(&self) -> Result<Vec<LoopbackAddress>> {
        match std::env::consts::OS {
            "linux" => Ok(parse_ip_addr_output(&run("ip", &["addr", "show", "lo"])?)),
            "macos" => Ok(parse_ifconfig_output(&run("ifconfig", &["lo0"])?)),
            other => Err(LoopbackError::UpstreamUnavailable(format!(
                "unsupported OS: {}",
                other
            ))),
        }
    }
}

fn run(program: &str, args: &[&str]) -> Result<String> {
    debug!("Running {} {}", program, args.join(" "));
    let output = Command::new(program).args(args).output().map_err(|e| {
        LoopbackError::UpstreamUnavailable(format!("failed to run {}: {}", program, e))
    })?;

    if !output.status.success() {
        return Err(LoopbackError::UpstreamUnavailable(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `ip addr show lo` output. The netmask field carries the CIDR token.
pub fn parse_ip_addr_output(output: &str) -> Vec<LoopbackAddress> {
    output
        .lines()
        .filter_map(|line| LINUX_INET.captures(line.trim()))
        .filter(|caps| is_additional_loopback(&caps["ip"]))
        .map(|caps| LoopbackAddress {
            interface: "lo".to_string(),
            ip: caps["ip"].to_string(),
            netmask: Some(caps["cidr"].to_string()),
        })
        .collect()
}

/// Parse `ifconfig lo0` output
pub fn parse_ifconfig_output(output: &str) -> Vec<LoopbackAddress> {
    output
        .lines()
        .filter_map(|line| DARWIN_INET.captures(line.trim()))
        .filter(|caps| is_additional_loopback(&caps["ip"]))
        .map(|caps| LoopbackAddress {
            interface: "lo0".to_string(),
            ip: caps["ip"].to_string(),
            netmask: caps.name("mask").map(|m| m.as_str().to_string()),
        })
        .collect()
}
