//! Configuration for exambox
//!
//! [`VBoxConfig`] is the runtime configuration consumed by the hypervisor CLI
//! layer; [`ConfigLoader`] assembles it from defaults, an optional JSON file
//! and `EXAMBOX_*` environment variables.

pub mod config;
pub mod loader;

pub use config::{ConfigFile, VBoxConfig};
pub use loader::ConfigLoader;
