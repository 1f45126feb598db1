use std::net::Ipv4Addr;

/// IP utility functions for validation of host-reported addresses

/// Check if a string is a valid IPv4 address
pub fn is_valid_ipv4(ip: &str) -> bool {
    ip.parse::<Ipv4Addr>().is_ok()
}

/// Check if an address is a loopback address other than the default `127.0.0.1`
pub fn is_additional_loopback(ip: &str) -> bool {
    match ip.parse::<Ipv4Addr>() {
        Ok(addr) => addr.is_loopback() && addr != Ipv4Addr::LOCALHOST,
        Err(_) => false,
    }
}
