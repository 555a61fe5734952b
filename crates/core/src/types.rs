//! Command and state types for the hypervisor CLI

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

use crate::constants::VM_STATE_RUNNING;

/// Ordered hypervisor CLI arguments, subcommand first
///
/// A command is immutable once built. The executable path is not part of it;
/// the executor prepends it at invocation time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VBoxCommand(Vec<String>);

impl VBoxCommand {
    /// Start a command with the given subcommand
    #[must_use]
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self(vec![subcommand.into()])
    }

    /// Create from a vector of strings
    #[must_use]
    pub fn from_vec(args: Vec<String>) -> Self {
        Self(args)
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.0.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0.extend(args.into_iter().map(Into::into));
        self
    }

    /// `showvminfo --machinereadable <vm>`
    #[must_use]
    pub fn show_vm_info(vm_name: &str) -> Self {
        Self::new("showvminfo").arg("--machinereadable").arg(vm_name)
    }

    /// `guestproperty get <vm> <property>`
    #[must_use]
    pub fn guest_property_get(vm_name: &str, property: &str) -> Self {
        Self::new("guestproperty")
            .arg("get")
            .arg(vm_name)
            .arg(property)
    }

    /// `--version`
    #[must_use]
    pub fn version() -> Self {
        Self::new("--version")
    }

    /// `closemedium disk <uuid-or-path>`
    #[must_use]
    pub fn close_medium_disk(medium: &str) -> Self {
        Self::new("closemedium").arg("disk").arg(medium)
    }

    /// The first argument, if any
    #[must_use]
    pub fn subcommand(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get a slice of the arguments
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Convert to inner Vec
    #[must_use]
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl Deref for VBoxCommand {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for VBoxCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl From<Vec<String>> for VBoxCommand {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl<const N: usize> From<[&str; N]> for VBoxCommand {
    fn from(args: [&str; N]) -> Self {
        Self(args.iter().map(|s| (*s).to_string()).collect())
    }
}

impl FromIterator<String> for VBoxCommand {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// VM state as reported by `showvminfo` (`VMState="..."`)
///
/// Treated opaquely apart from `running`. The empty string means the VM is
/// not installed or its state is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VmState(String);

impl VmState {
    #[must_use]
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    /// State of a VM that is not installed
    #[must_use]
    pub fn unknown() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.0 == VM_STATE_RUNNING
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VmState {
    fn from(state: String) -> Self {
        Self(state)
    }
}

impl From<&str> for VmState {
    fn from(state: &str) -> Self {
        Self(state.to_string())
    }
}
