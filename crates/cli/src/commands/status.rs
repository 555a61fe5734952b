use exambox_config::VBoxConfig;
use exambox_vboxmanage::{Error, VBoxManage};
use serde::Serialize;

/// Snapshot of everything the facade can tell about the hypervisor and VM
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub vm: String,
    /// Resolved executable, `None` when it could not be found
    pub vboxmanage: Option<String>,
    pub vboxmanage_installed: bool,
    pub version: Option<String>,
    pub vm_installed: Option<bool>,
    pub vm_state: Option<String>,
    pub cache: Option<CacheReport>,
}

/// Response cache counters after the status queries ran
#[derive(Debug, Serialize)]
pub struct CacheReport {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub hit_rate: f64,
}

impl StatusReport {
    pub fn collect(vbox: &VBoxManage) -> Self {
        let vboxmanage_installed = vbox.is_vboxmanage_installed();
        let version = vbox
            .version()
            .map(|v| v.to_string())
            .map_err(|e| tracing::warn!(error = %e, "Could not read VBoxManage version"))
            .ok();
        let vm_installed = vbox
            .is_vm_installed()
            .map_err(|e| tracing::warn!(error = %e, "Could not determine whether the VM is installed"))
            .ok();
        let vm_state = vbox
            .vm_state()
            .map(|state| state.into_inner())
            .map_err(|e| tracing::warn!(error = %e, "Could not read VM state"))
            .ok();

        let stats = vbox.cache().stats();
        Self {
            vm: vbox.vm_name().to_string(),
            vboxmanage: Some(vbox.program().display().to_string()),
            vboxmanage_installed,
            version,
            vm_installed,
            vm_state,
            cache: Some(CacheReport {
                hits: stats.hits,
                misses: stats.misses,
                writes: stats.writes,
                hit_rate: stats.hit_rate(),
            }),
        }
    }

    /// Report for a machine where the executable could not be located
    pub fn missing(config: &VBoxConfig) -> Self {
        Self {
            vm: config.vm_name.clone(),
            vboxmanage: None,
            vboxmanage_installed: false,
            version: None,
            vm_installed: None,
            vm_state: None,
            cache: None,
        }
    }
}

pub fn execute(config: &VBoxConfig, json: bool) -> eyre::Result<()> {
    let report = match VBoxManage::new(config) {
        Ok(vbox) => StatusReport::collect(&vbox),
        Err(e @ Error::NotFound { .. }) => {
            tracing::warn!(error = %e, "VBoxManage is not available");
            StatusReport::missing(config)
        }
        Err(e) => return Err(e.into()),
    };
    print(&report, json)
}

pub fn print(report: &StatusReport, json: bool) -> eyre::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    let unknown = || "unknown".to_string();
    println!("VM:          {}", report.vm);
    println!(
        "VBoxManage:  {}",
        report.vboxmanage.as_deref().unwrap_or("not found")
    );
    println!("Installed:   {}", report.vboxmanage_installed);
    println!("Version:     {}", report.version.clone().unwrap_or_else(unknown));
    println!(
        "Registered:  {}",
        report
            .vm_installed
            .map_or_else(unknown, |installed| installed.to_string())
    );
    println!(
        "State:       {}",
        match report.vm_state.as_deref() {
            Some("") => "not installed".to_string(),
            Some(state) => state.to_string(),
            None => unknown(),
        }
    );
    if let Some(cache) = &report.cache {
        println!(
            "Cache:       {} hits, {} misses ({:.0}% hit rate)",
            cache.hits,
            cache.misses,
            cache.hit_rate * 100.0
        );
    }
    Ok(())
}
