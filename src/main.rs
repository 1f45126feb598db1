use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::debug;
use std::path::PathBuf;

use loopback_manager::config_loader;
use loopback_manager::host::SystemHost;
use loopback_manager::ip::{AssignmentLedger, RepositoryKey};
use loopback_manager::orchestrator::Orchestrator;
use loopback_manager::output;

/// Manage loopback IP addresses for Docker Compose projects
#[derive(Parser, Debug)]
#[command(name = "loopback-manager", author, version, about, long_about = None)]
struct Args {
    /// Config file (default is $HOME/.config/loopback-manager/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// List all repositories and their IP assignments
    #[command(alias = "ls")]
    List {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Scan for unassigned repositories
    Scan {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Assign an IP to a repository
    Assign {
        org: String,
        name: String,
        /// Specific IP address to assign
        #[arg(short, long)]
        ip: Option<String>,
    },
    /// Remove a repository's IP assignment
    #[command(aliases = ["rm", "del"])]
    Remove { org: String, name: String },
    /// Auto-assign IPs to all unassigned repositories (dry-run by default)
    #[command(alias = "auto")]
    AutoAssign {
        /// Execute the assignments instead of only showing them
        #[arg(short, long)]
        execute: bool,
    },
    /// Check for duplicate IPs
    #[command(alias = "validate")]
    Check {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// List loopback addresses configured on the host
    HostList {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Check assigned IPs against the host's loopback configuration
    SyncCheck {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level.as_str())).init();

    let config = config_loader::load_config(args.config.as_deref())?;
    let ledger_path = config_loader::ledger_path(&config)?;
    debug!("Base directory: {:?}", config.base_dir);
    debug!("Ledger file: {:?}", ledger_path);

    let ledger = AssignmentLedger::load(&ledger_path)
        .wrap_err_with(|| format!("Failed to load assignments from '{}'", ledger_path.display()))?;
    let mut orchestrator = Orchestrator::new(config, ledger);

    run(args.command, &mut orchestrator)
}

fn run(command: Commands, orchestrator: &mut Orchestrator) -> Result<()> {
    match command {
        Commands::List { json } => {
            let repos = orchestrator.list()?;
            if json {
                print!("{}", output::to_json(&repos)?);
            } else {
                print!("{}", output::render_repository_table(&repos));
            }
        }
        Commands::Scan { json } => {
            let repos = orchestrator.scan()?;
            if json {
                print!("{}", output::to_json(&repos)?);
            } else {
                print!("{}", output::render_unassigned(&repos));
            }
        }
        Commands::Assign { org, name, ip } => {
            let outcome = orchestrator.assign(&org, &name, ip.as_deref())?;
            print!("{}", output::render_assign(&outcome));
        }
        Commands::Remove { org, name } => {
            let ip = orchestrator.remove(&org, &name)?;
            print!("{}", output::render_remove(&RepositoryKey::new(org, name), &ip));
        }
        Commands::AutoAssign { execute } => {
            let report = orchestrator.auto_assign(execute)?;
            print!("{}", output::render_auto_assign(&report));
            report
                .into_result()
                .wrap_err("Auto-assignment stopped before completing")?;
        }
        Commands::Check { json } => {
            let duplicates = orchestrator.duplicates();
            if json {
                print!("{}", output::to_json(&duplicates)?);
            } else {
                print!("{}", output::render_duplicates(&duplicates));
            }
        }
        Commands::HostList { json } => {
            let addresses = orchestrator
                .host_addresses(&SystemHost)
                .wrap_err("Failed to get host loopback addresses")?;
            if json {
                print!("{}", output::to_json(&addresses)?);
            } else {
                print!("{}", output::render_host_addresses(&addresses));
            }
        }
        Commands::SyncCheck { json } => {
            let report = orchestrator
                .sync_check(&SystemHost)
                .wrap_err("Failed to get host loopback addresses")?;
            if json {
                print!("{}", output::to_json(&report)?);
            } else {
                print!("{}", output::render_reconciliation(&report));
            }
        }
    }
    Ok(())
}
