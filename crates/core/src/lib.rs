//! Core domain types, errors, and constants for `exambox`.
//!
//! This crate holds the pieces shared by every other crate in the workspace:
//!
//! - **`errors`**: the `Error` enum and `Result` alias covering every failure
//!   the hypervisor CLI layer can report (invocation, remediation, parsing,
//!   configuration).
//! - **`types`**: newtypes for a hypervisor CLI command line and the VM state
//!   string reported by `showvminfo`.
//! - **`constants`**: subcommand names, diagnostic substrings, cache keys and
//!   default timings.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
