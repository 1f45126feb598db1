use crate::config::Config;
use crate::utils::paths::{default_config_path, default_ledger_path, expand_tilde};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Environment variable overriding `base_dir`
pub const BASE_DIR_ENV: &str = "GITHUB_BASE_DIR";
/// Environment variable overriding `data_file`
pub const DATA_FILE_ENV: &str = "LOOPBACK_MANAGER_DATA_FILE";

/// Load configuration for this invocation.
///
/// With an explicit path the file must exist. Without one, the default
/// `~/.config/loopback-manager/config.yaml` is used when present and the
/// built-in defaults otherwise. Environment overrides are applied last,
/// then `~` is expanded and the result validated.
///
/// Precedence is defaults < YAML file < environment: `GITHUB_BASE_DIR`
/// replaces a `base_dir` set in the file, so a one-off shell export
/// redirects a single invocation without editing the config.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config> {
    let mut config = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(eyre!("Config file '{}' does not exist", path.display()));
            }
            load_config_file(path)?
        }
        None => {
            let path = default_config_path()?;
            if path.exists() {
                load_config_file(&path)?
            } else {
                debug!("No config file at {}, using defaults", path.display());
                Config::default()
            }
        }
    };

    apply_env_overrides(&mut config, &EnvOverrides::from_env());
    resolve_paths(&mut config)?;
    config.validate()?;

    Ok(config)
}

/// Parse a YAML configuration file. An empty file means defaults.
pub fn load_config_file(config_path: &Path) -> Result<Config> {
    info!("Using config file: {}", config_path.display());

    let content = std::fs::read_to_string(config_path)
        .wrap_err_with(|| format!("Failed to read config file '{}'", config_path.display()))?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config file '{}'", config_path.display()))?;
    Ok(config)
}

/// Environment values that can override YAML settings
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub base_dir: Option<String>,
    pub data_file: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let non_empty = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            base_dir: non_empty(BASE_DIR_ENV),
            data_file: non_empty(DATA_FILE_ENV),
        }
    }
}

/// Apply environment overrides to a configuration
pub fn apply_env_overrides(config: &mut Config, overrides: &EnvOverrides) {
    if let Some(base_dir) = &overrides.base_dir {
        debug!("{} overrides base_dir with {}", BASE_DIR_ENV, base_dir);
        config.base_dir = PathBuf::from(base_dir);
    }

    if let Some(data_file) = &overrides.data_file {
        debug!("{} overrides data_file with {}", DATA_FILE_ENV, data_file);
        config.data_file = Some(PathBuf::from(data_file));
    }
}

fn resolve_paths(config: &mut Config) -> Result<()> {
    config.base_dir = expand_tilde(&config.base_dir)?;
    if let Some(data_file) = &config.data_file {
        config.data_file = Some(expand_tilde(data_file)?);
    }
    Ok(())
}

/// Ledger location for a loaded configuration
pub fn ledger_path(config: &Config) -> Result<PathBuf> {
    match &config.data_file {
        Some(path) => Ok(path.clone()),
        None => Ok(default_ledger_path()?),
    }
}
