mod types;

pub use types::*;

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Returns the config directory, e.g. `~/.config/devorient/`.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("devorient");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns the config file path: `<config dir>/devorient/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Config for one run of the application.
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub config: AppConfig,
    /// Write `config` back on exit. Only set when no file existed, so a file
    /// that failed to parse is never overwritten with defaults.
    pub persist: bool,
}

/// Load the config at `path` for startup, falling back to defaults on error.
pub fn load_startup_config(path: &Path) -> StartupConfig {
    let first_run = !path.exists();
    match load_config_from(path) {
        Ok(config) => StartupConfig {
            config,
            persist: first_run,
        },
        Err(e) => {
            warn!(?e, ?path, "Failed to load config, using defaults");
            StartupConfig {
                config: AppConfig::default(),
                persist: false,
            }
        }
    }
}

/// Load config from `path`, or return defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        info!(?path, "Loaded config");
        Ok(config)
    } else {
        info!("No config found, using defaults");
        Ok(AppConfig::default())
    }
}

/// Save config to `path`.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    info!(?path, "Saved config");
    Ok(())
}
