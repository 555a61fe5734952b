//! Constants used throughout the exambox codebase

use std::time::Duration;

// Hypervisor CLI
pub const VBOXMANAGE_BINARY: &str = "VBoxManage";
pub const DEFAULT_VM_NAME: &str = "NaksuAbittiKTP";

// Diagnostics emitted by the hypervisor CLI
pub const DIAGNOSTIC_VM_NOT_INSTALLED: &str = "Could not find a registered machine named";
pub const DIAGNOSTIC_DUPLICATE_HARD_DISK: &str = "Cannot register the hard disk";

// VM state reported by showvminfo for a started machine
pub const VM_STATE_RUNNING: &str = "running";

// Response cache keys
pub const CACHE_KEY_VM_INFO: &str = "showvminfo";
pub const CACHE_KEY_VM_STATE: &str = "vmstate";
pub const CACHE_KEY_VERSION: &str = "version";
pub const CACHE_KEY_PROPERTY_PREFIX: &str = "guestproperty:";

// Default timings
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_WAIT_ATTEMPTS: u32 = 240;

// Environment variable names
pub const EXAMBOX_LOG_VAR: &str = "EXAMBOX_LOG";
pub const EXAMBOX_VM_NAME_VAR: &str = "EXAMBOX_VM_NAME";
pub const EXAMBOX_VBOXMANAGE_VAR: &str = "EXAMBOX_VBOXMANAGE";
pub const EXAMBOX_CACHE_TTL_VAR: &str = "EXAMBOX_CACHE_TTL_SECS";
pub const EXAMBOX_STATE_TTL_VAR: &str = "EXAMBOX_STATE_TTL_SECS";
pub const EXAMBOX_POLL_INTERVAL_VAR: &str = "EXAMBOX_POLL_INTERVAL_MS";
pub const EXAMBOX_MAX_WAIT_ATTEMPTS_VAR: &str = "EXAMBOX_MAX_WAIT_ATTEMPTS";
pub const VBOX_MSI_INSTALL_PATH_VAR: &str = "VBOX_MSI_INSTALL_PATH";
