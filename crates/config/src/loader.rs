//! Configuration loader for exambox
//!
//! Precedence, lowest first: built-in defaults, JSON configuration file,
//! `EXAMBOX_*` environment variables, explicit overrides set on the loader.

use crate::config::{ConfigFile, VBoxConfig};
use exambox_core::{
    Error, Result, EXAMBOX_CACHE_TTL_VAR, EXAMBOX_MAX_WAIT_ATTEMPTS_VAR,
    EXAMBOX_POLL_INTERVAL_VAR, EXAMBOX_STATE_TTL_VAR, EXAMBOX_VBOXMANAGE_VAR,
    EXAMBOX_VM_NAME_VAR,
};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Builds a validated [`VBoxConfig`]
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Optional JSON file to read
    file: Option<PathBuf>,
    /// Whether `EXAMBOX_*` variables are consulted
    skip_env: bool,
    vm_name: Option<String>,
    vboxmanage_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a JSON configuration file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Ignore environment variables
    pub fn without_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Override the VM name
    pub fn vm_name(mut self, name: impl Into<String>) -> Self {
        self.vm_name = Some(name.into());
        self
    }

    /// Override the hypervisor CLI path
    pub fn vboxmanage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.vboxmanage_path = Some(path.into());
        self
    }

    /// Load and validate the configuration
    pub fn load(self) -> Result<VBoxConfig> {
        let mut config = VBoxConfig::default();

        if let Some(path) = &self.file {
            config.merge_file(read_config_file(path)?);
            tracing::debug!(path = %path.display(), "Loaded configuration file");
        }

        if !self.skip_env {
            apply_env(&mut config)?;
        }

        if let Some(vm_name) = self.vm_name {
            config.vm_name = vm_name;
        }
        if let Some(path) = self.vboxmanage_path {
            config.vboxmanage_path = Some(path);
        }

        config.validate()?;
        Ok(config)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::file_system(path, "read", e))?;
    serde_json::from_str(&contents).map_err(|e| {
        Error::json(
            format!("invalid configuration file '{}'", path.display()),
            e,
        )
    })
}

fn apply_env(config: &mut VBoxConfig) -> Result<()> {
    if let Some(vm_name) = env_string(EXAMBOX_VM_NAME_VAR) {
        config.vm_name = vm_name;
    }
    if let Some(path) = env_string(EXAMBOX_VBOXMANAGE_VAR) {
        config.vboxmanage_path = Some(PathBuf::from(path));
    }
    if let Some(secs) = env_number::<u64>(EXAMBOX_CACHE_TTL_VAR)? {
        config.cache_ttl = Duration::from_secs(secs);
    }
    if let Some(secs) = env_number::<u64>(EXAMBOX_STATE_TTL_VAR)? {
        config.state_ttl = Duration::from_secs(secs);
    }
    if let Some(ms) = env_number::<u64>(EXAMBOX_POLL_INTERVAL_VAR)? {
        config.poll_interval = Duration::from_millis(ms);
    }
    if let Some(attempts) = env_number::<u32>(EXAMBOX_MAX_WAIT_ATTEMPTS_VAR)? {
        config.max_wait_attempts = attempts;
    }
    Ok(())
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_number<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(name) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
            Error::configuration(format!("invalid value '{raw}' for {name}: {e}"))
        }),
        None => Ok(None),
    }
}
