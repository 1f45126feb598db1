//! # Loopback Manager - unique loopback addresses for local compose projects
//!
//! Running several Docker Compose projects side by side on one machine
//! tends to end in port collisions. This crate gives every project under a
//! base directory its own loopback address (`127.0.0.x`), records the
//! assignments in a flat ledger file and mirrors each address into the
//! project's `.env` file as `LOOPBACK_IP`.
//!
//! ## Architecture
//!
//! - `ip`: address range, persisted assignment ledger and allocation
//! - `catalog`: discovery of `<base>/<org>/<repo>` compose projects
//! - `env_file`: `.env` upsert of the assigned address
//! - `host`: host loopback introspection and ledger/host reconciliation
//! - `orchestrator`: the assignment workflow over one loaded ledger
//! - `config` / `config_loader`: YAML configuration and environment overrides
//! - `output`: text and JSON rendering for the CLI
//! - `utils`: per-user paths and IP helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use loopback_manager::{config_loader, ip::AssignmentLedger, orchestrator::Orchestrator};
//!
//! let config = config_loader::load_config(None)?;
//! let ledger = AssignmentLedger::load(&config_loader::ledger_path(&config)?)?;
//! let mut orchestrator = Orchestrator::new(config, ledger);
//!
//! let outcome = orchestrator.assign("acme", "web", None)?;
//! println!("{} -> {}", outcome.key, outcome.ip);
//! # Ok::<(), color_eyre::eyre::Error>(())
//! ```
//!
//! ## Ledger Format
//!
//! ```text
//! # <org> <name> <ip>
//! acme api 127.0.0.11
//! acme web 127.0.0.10
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`error::LoopbackError`]; configuration
//! loading and the binary use `color_eyre` for context-rich reports.

pub mod catalog;
pub mod config;
pub mod config_loader;
pub mod env_file;
pub mod error;
pub mod host;
pub mod ip;
pub mod orchestrator;
pub mod output;
pub mod utils;

pub use error::LoopbackError;
