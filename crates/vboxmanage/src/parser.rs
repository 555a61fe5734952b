//! Extraction rules for `VBoxManage` output
//!
//! Every rule returns an explicit "no match" (`None` or `false`) and leaves
//! the decision about whether that is an error to the caller.

use exambox_core::{DIAGNOSTIC_DUPLICATE_HARD_DISK, DIAGNOSTIC_VM_NOT_INSTALLED};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::remediation::DuplicateDisk;

/// `VMState="running"` in `showvminfo --machinereadable`
static VM_STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"VMState="([^"]+)""#).unwrap());

/// `Value: <value>` line printed by `guestproperty get`
static GUEST_PROPERTY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^Value:[ \t]*(\S(?:[^\r\n]*\S)?)").unwrap());

/// Leading `major.minor.patch` of `--version`, e.g. `7.0.10r158379`
static VERSION_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+\.\d+\.\d+)").unwrap());

static DUPLICATE_HARD_DISK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"Cannot register the hard disk '(?P<new_path>[^']+)' \{(?P<new_uuid>[0-9a-fA-F-]+)\} because a hard disk '(?P<path>[^']+)' with UUID \{(?P<uuid>[0-9a-fA-F-]+)\} already exists",
    )
    .unwrap()
});

/// Output says the VM is not registered
pub fn is_vm_not_installed(output: &str) -> bool {
    output.contains(DIAGNOSTIC_VM_NOT_INSTALLED)
}

/// Output carries the duplicate hard disk diagnostic, parseable or not
pub fn has_duplicate_hard_disk(output: &str) -> bool {
    output.contains(DIAGNOSTIC_DUPLICATE_HARD_DISK)
}

pub fn vm_state(output: &str) -> Option<String> {
    first_capture(&VM_STATE, output)
}

pub fn guest_property_value(output: &str) -> Option<String> {
    first_capture(&GUEST_PROPERTY_VALUE, output)
}

pub fn version_prefix(output: &str) -> Option<String> {
    first_capture(&VERSION_PREFIX, output.trim_start())
}

/// Paths and identifiers of a duplicate hard disk registration
pub fn duplicate_hard_disk(output: &str) -> Option<DuplicateDisk> {
    let captures = DUPLICATE_HARD_DISK.captures(output)?;
    Some(DuplicateDisk {
        new_path: captures["new_path"].to_string(),
        new_uuid: captures["new_uuid"].to_string(),
        registered_path: captures["path"].to_string(),
        uuid: captures["uuid"].to_string(),
    })
}

/// First capture group of `pattern` in `text`
pub fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}
