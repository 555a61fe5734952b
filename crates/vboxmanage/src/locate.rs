//! Discovery of the `VBoxManage` executable

use exambox_core::{Error, Result, VBOXMANAGE_BINARY};
use std::path::{Path, PathBuf};

/// Resolve the hypervisor CLI
///
/// An explicit path wins and must exist. Otherwise `PATH` is searched, then
/// the platform's usual VirtualBox install locations.
pub fn locate_vboxmanage(explicit: Option<&Path>) -> Result<PathBuf> {
    locate_in(
        explicit,
        || which::which(VBOXMANAGE_BINARY).ok(),
        &default_locations(),
    )
}

fn locate_in<F>(explicit: Option<&Path>, search_path: F, candidates: &[PathBuf]) -> Result<PathBuf>
where
    F: FnOnce() -> Option<PathBuf>,
{
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::not_found(
            VBOXMANAGE_BINARY,
            format!("configured path '{}' does not exist", path.display()),
        ));
    }

    if let Some(path) = search_path() {
        tracing::debug!(path = %path.display(), "Found VBoxManage on PATH");
        return Ok(path);
    }

    match candidates.iter().find(|candidate| candidate.is_file()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Found VBoxManage in default location");
            Ok(path.clone())
        }
        None => Err(Error::not_found(
            VBOXMANAGE_BINARY,
            "not on PATH or in any default VirtualBox install location",
        )),
    }
}

#[cfg(windows)]
fn default_locations() -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Ok(dir) = std::env::var(exambox_core::VBOX_MSI_INSTALL_PATH_VAR) {
        locations.push(PathBuf::from(dir).join("VBoxManage.exe"));
    }
    if let Ok(dir) = std::env::var("ProgramFiles") {
        locations.push(
            PathBuf::from(dir)
                .join("Oracle")
                .join("VirtualBox")
                .join("VBoxManage.exe"),
        );
    }
    locations.push(PathBuf::from(
        r"C:\Program Files\Oracle\VirtualBox\VBoxManage.exe",
    ));
    locations
}

#[cfg(target_os = "macos")]
fn default_locations() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/Applications/VirtualBox.app/Contents/MacOS/VBoxManage"),
        PathBuf::from("/usr/local/bin/VBoxManage"),
    ]
}

#[cfg(not(any(windows, target_os = "macos")))]
fn default_locations() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/bin/VBoxManage"),
        PathBuf::from("/usr/lib/virtualbox/VBoxManage"),
        PathBuf::from("/usr/local/bin/VBoxManage"),
    ]
}
