//! Shared utilities: per-user paths and IP helpers.

pub mod ip_utils;
pub mod paths;
