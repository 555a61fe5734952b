//! Configuration types

use exambox_core::{
    Error, Result, DEFAULT_CACHE_TTL, DEFAULT_MAX_WAIT_ATTEMPTS, DEFAULT_POLL_INTERVAL,
    DEFAULT_STATE_TTL, DEFAULT_VM_NAME,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for the hypervisor CLI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VBoxConfig {
    /// Name of the exam server VM
    pub vm_name: String,
    /// Explicit hypervisor CLI path; discovered when `None`
    pub vboxmanage_path: Option<PathBuf>,
    /// TTL for slowly changing facts (version, guest properties, VM info)
    pub cache_ttl: Duration,
    /// TTL for the VM running/stopped state
    pub state_ttl: Duration,
    /// Sleep between two polls of the busy serializer
    pub poll_interval: Duration,
    /// Polls before a waiter proceeds without exclusivity
    pub max_wait_attempts: u32,
}

impl Default for VBoxConfig {
    fn default() -> Self {
        Self {
            vm_name: DEFAULT_VM_NAME.to_string(),
            vboxmanage_path: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            state_ttl: DEFAULT_STATE_TTL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait_attempts: DEFAULT_MAX_WAIT_ATTEMPTS,
        }
    }
}

impl VBoxConfig {
    /// Default configuration for the given VM
    pub fn for_vm(vm_name: impl Into<String>) -> Self {
        Self {
            vm_name: vm_name.into(),
            ..Self::default()
        }
    }

    /// Check the configuration for values the layer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.vm_name.trim().is_empty() {
            return Err(Error::configuration("vm name must not be empty"));
        }
        if self.cache_ttl.is_zero() {
            return Err(Error::configuration("cache ttl must be greater than zero"));
        }
        if self.state_ttl.is_zero() {
            return Err(Error::configuration("state ttl must be greater than zero"));
        }
        if self.cache_ttl < self.state_ttl {
            return Err(Error::configuration(format!(
                "cache ttl ({:?}) must not be shorter than state ttl ({:?})",
                self.cache_ttl, self.state_ttl
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::configuration(
                "serializer poll interval must be greater than zero",
            ));
        }
        if self.max_wait_attempts == 0 {
            return Err(Error::configuration(
                "serializer wait attempts must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Apply the values present in a configuration file
    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(vm_name) = file.vm_name {
            self.vm_name = vm_name;
        }
        if let Some(path) = file.vboxmanage_path {
            self.vboxmanage_path = Some(path);
        }
        if let Some(secs) = file.cache_ttl_secs {
            self.cache_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = file.state_ttl_secs {
            self.state_ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = file.poll_interval_ms {
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = file.max_wait_attempts {
            self.max_wait_attempts = attempts;
        }
    }
}

/// On-disk JSON representation; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub vm_name: Option<String>,
    pub vboxmanage_path: Option<PathBuf>,
    pub cache_ttl_secs: Option<u64>,
    pub state_ttl_secs: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub max_wait_attempts: Option<u32>,
}

impl From<&VBoxConfig> for ConfigFile {
    fn from(config: &VBoxConfig) -> Self {
        Self {
            vm_name: Some(config.vm_name.clone()),
            vboxmanage_path: config.vboxmanage_path.clone(),
            cache_ttl_secs: Some(config.cache_ttl.as_secs()),
            state_ttl_secs: Some(config.state_ttl.as_secs()),
            poll_interval_ms: Some(config.poll_interval.as_millis() as u64),
            max_wait_attempts: Some(config.max_wait_attempts),
        }
    }
}
