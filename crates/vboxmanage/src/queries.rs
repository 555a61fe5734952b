//! Query facade over the hypervisor CLI
//!
//! Each query looks in the response cache first and only invokes
//! `VBoxManage` on a miss. Parsed results go back into the cache under
//! the TTL class that matches how quickly the fact changes.

use crate::executor::VBoxManage;
use crate::locate::locate_vboxmanage;
use crate::parser;
use exambox_cache::TtlClass;
use exambox_core::{
    Error, Result, VBoxCommand, VmState, CACHE_KEY_PROPERTY_PREFIX, CACHE_KEY_VERSION,
    CACHE_KEY_VM_INFO, CACHE_KEY_VM_STATE,
};
use regex::Regex;
use semver::Version;

impl VBoxManage {
    /// Whether the configured VM is registered
    ///
    /// Never cached: install and removal must be observed immediately.
    pub fn is_vm_installed(&self) -> Result<bool> {
        match self.run_command_without_logging(&VBoxCommand::show_vm_info(self.vm_name())) {
            Ok(output) if parser::is_vm_not_installed(&output) => Ok(false),
            Ok(_) => Ok(true),
            Err(e) if e.output().is_some_and(parser::is_vm_not_installed) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Current VM state, unknown (empty) when the VM is not installed
    pub fn vm_state(&self) -> Result<VmState> {
        if let Some(state) = self.cached(CACHE_KEY_VM_STATE) {
            return Ok(VmState::new(state));
        }

        let output =
            match self.run_command_without_logging(&VBoxCommand::show_vm_info(self.vm_name())) {
                Ok(output) => output,
                Err(e) if e.output().is_some_and(parser::is_vm_not_installed) => {
                    return Ok(VmState::unknown())
                }
                Err(e) => return Err(e),
            };
        if parser::is_vm_not_installed(&output) {
            return Ok(VmState::unknown());
        }

        let state = parser::vm_state(&output).ok_or_else(|| Error::parse("vm state", &output))?;
        self.store(CACHE_KEY_VM_STATE, &state, TtlClass::Short);
        Ok(VmState::new(state))
    }

    /// True iff the VM state is exactly "running"
    pub fn is_vm_running(&self) -> Result<bool> {
        Ok(self.vm_state()?.is_running())
    }

    /// Value of a guest property, empty when unset or unreadable
    pub fn guest_property(&self, property: &str) -> String {
        let key = format!("{CACHE_KEY_PROPERTY_PREFIX}{property}");
        if let Some(value) = self.cached(&key) {
            tracing::debug!(property, "Guest property served from cache");
            tracing::trace!(property, value = %value, "Cached guest property value");
            return value;
        }

        let command = VBoxCommand::guest_property_get(self.vm_name(), property);
        let value = match self.run_command_without_logging(&command) {
            Ok(output) => parser::guest_property_value(&output).unwrap_or_default(),
            Err(e) => {
                tracing::debug!(property, error = %e, "Could not read guest property, treating as unset");
                String::new()
            }
        };

        self.store(&key, &value, TtlClass::Long);
        tracing::debug!(property, "Guest property cached");
        tracing::trace!(property, value = %value, "Guest property value");
        value
    }

    /// Version of the hypervisor CLI
    pub fn version(&self) -> Result<Version> {
        if let Some(cached) = self.cached(CACHE_KEY_VERSION) {
            return Version::parse(&cached).map_err(|e| Error::version(cached, e));
        }

        let output = self.run_command(&VBoxCommand::version())?;
        let prefix =
            parser::version_prefix(&output).ok_or_else(|| Error::parse("version", &output))?;
        let version = Version::parse(&prefix).map_err(|e| Error::version(prefix, e))?;

        self.store(CACHE_KEY_VERSION, &version.to_string(), TtlClass::Long);
        Ok(version)
    }

    /// Raw machine-readable VM info, empty when it could not be read
    ///
    /// Shared by every field query, and cached even when the run failed.
    pub fn vm_info(&self) -> String {
        if let Some(info) = self.cached(CACHE_KEY_VM_INFO) {
            return info;
        }

        let info = self
            .run_command_without_logging(&VBoxCommand::show_vm_info(self.vm_name()))
            .unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Could not read VM info");
                String::new()
            });

        self.store(CACHE_KEY_VM_INFO, &info, TtlClass::Long);
        info
    }

    /// First capture group of `pattern` in the VM info, or empty
    pub fn vm_info_by_regex(&self, pattern: &Regex) -> String {
        parser::first_capture(pattern, &self.vm_info()).unwrap_or_default()
    }

    /// Whether the hypervisor CLI can be found and answers `--version`
    ///
    /// Always runs the CLI and only looks at the exit status, so a working
    /// install with unusual version output still counts.
    pub fn is_vboxmanage_installed(&self) -> bool {
        if let Err(e) = locate_vboxmanage(Some(self.program())) {
            tracing::debug!(error = %e, "VBoxManage not found");
            return false;
        }

        match self.run_command(&VBoxCommand::version()) {
            Ok(output) => {
                tracing::debug!(version = %output.trim(), "VBoxManage is installed");
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "VBoxManage --version failed");
                false
            }
        }
    }

    /// Discard every cached response
    pub fn reset_response_cache(&self) {
        self.cache.reset();
    }

    fn cached(&self, key: &str) -> Option<String> {
        let value = self.cache.get(key);
        exambox_utils::tracing::cache_event(key, value.is_some());
        value
    }

    fn store(&self, key: &str, value: &str, class: TtlClass) {
        if let Err(e) = self.cache.set_with_class(key, value, class) {
            tracing::debug!(key, error = %e, "Failed to cache response");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runner::ProcessRunner;
    use crate::testing::ScriptedRunner;
    use crate::VBoxManage;
    use exambox_config::VBoxConfig;
    use exambox_core::VBoxCommand;
    use regex::Regex;
    use std::sync::Arc;
    use std::time::Duration;

    const RUNNING_INFO: &str = "name=\"exam\"\nmemory=8192\nVMState=\"running\"\n";
    const NOT_INSTALLED: &str =
        "VBoxManage: error: Could not find a registered machine named 'exam'\n";

    fn context(runner: &Arc<ScriptedRunner>) -> VBoxManage {
        let config = VBoxConfig {
            poll_interval: Duration::from_millis(1),
            ..VBoxConfig::for_vm("exam")
        };
        let runner: Arc<dyn ProcessRunner> = runner.clone();
        VBoxManage::with_runner(&config, "VBoxManage", runner).unwrap()
    }

    fn show_info() -> VBoxCommand {
        VBoxCommand::show_vm_info("exam")
    }

    #[test]
    fn test_installed_when_info_succeeds() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&show_info(), RUNNING_INFO);
        assert!(context(&runner).is_vm_installed().unwrap());
    }

    #[test]
    fn test_not_installed_from_failed_run() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.fail(&show_info(), NOT_INSTALLED);
        assert!(!context(&runner).is_vm_installed().unwrap());
    }

    #[test]
    fn test_installed_propagates_other_failures() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.fail(&show_info(), "VBoxManage: error: E_ACCESSDENIED");
        assert!(context(&runner).is_vm_installed().is_err());
    }

    #[test]
    fn test_installed_not_cached() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&show_info(), RUNNING_INFO);
        let vbox = context(&runner);

        vbox.is_vm_installed().unwrap();
        vbox.is_vm_installed().unwrap();
        assert_eq!(runner.call_count(&show_info()), 2);
    }

    #[test]
    fn test_state_cached_under_short_ttl() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&show_info(), RUNNING_INFO);
        let vbox = context(&runner);

        assert!(vbox.is_vm_running().unwrap());
        assert!(vbox.is_vm_running().unwrap());
        assert_eq!(runner.call_count(&show_info()), 1);
    }

    #[test]
    fn test_not_installed_state_is_unknown_and_uncached() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.fail(&show_info(), NOT_INSTALLED);
        let vbox = context(&runner);

        assert!(vbox.vm_state().unwrap().is_unknown());
        assert!(!vbox.is_vm_running().unwrap());
        assert_eq!(runner.call_count(&show_info()), 2);
    }

    #[test]
    fn test_missing_state_is_parse_error() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&show_info(), "name=\"exam\"\n");
        let err = context(&runner).vm_state().unwrap_err();
        assert!(matches!(err, exambox_core::Error::Parse { .. }));
    }

    #[test]
    fn test_poweroff_is_not_running() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&show_info(), "VMState=\"poweroff\"\n");
        assert!(!context(&runner).is_vm_running().unwrap());
    }

    #[test]
    fn test_guest_property_read_and_cached() {
        let runner = Arc::new(ScriptedRunner::new());
        let get = VBoxCommand::guest_property_get("exam", "mode");
        runner.succeed(&get, "Value: exam-mode\n");
        let vbox = context(&runner);

        assert_eq!(vbox.guest_property("mode"), "exam-mode");
        assert_eq!(vbox.guest_property("mode"), "exam-mode");
        assert_eq!(runner.call_count(&get), 1);
    }

    #[test]
    fn test_guest_property_failure_cached_as_empty() {
        let runner = Arc::new(ScriptedRunner::new());
        let get = VBoxCommand::guest_property_get("exam", "mode");
        runner.fail(&get, "VBoxManage: error: Could not find a registered machine named 'exam'");
        runner.succeed(&get, "Value: exam-mode\n");
        let vbox = context(&runner);

        assert_eq!(vbox.guest_property("mode"), "");
        assert_eq!(vbox.guest_property("mode"), "");
        assert_eq!(runner.call_count(&get), 1);
    }

    #[test]
    fn test_version_parsed_and_cached() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(
            &VBoxCommand::version(),
            "6.1.26\nOracle VM VirtualBox Command Line Management Interface\n",
        );
        let vbox = context(&runner);

        assert_eq!(vbox.version().unwrap(), semver::Version::new(6, 1, 26));
        assert_eq!(vbox.version().unwrap(), semver::Version::new(6, 1, 26));
        assert_eq!(runner.total_calls(), 1);
    }

    #[test]
    fn test_version_without_numeric_prefix_is_error() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&VBoxCommand::version(), "Oracle VM VirtualBox\n");
        let vbox = context(&runner);

        assert!(vbox.version().is_err());
        assert!(vbox.cache().is_empty());
    }

    #[test]
    fn test_unparseable_cached_version_is_error() {
        let runner = Arc::new(ScriptedRunner::new());
        let vbox = context(&runner);
        vbox.cache()
            .set("version", "not-a-version", Duration::from_secs(60))
            .unwrap();

        assert!(matches!(
            vbox.version(),
            Err(exambox_core::Error::Version { .. })
        ));
        assert_eq!(runner.total_calls(), 0);
    }

    #[test]
    fn test_vm_info_fields_share_one_invocation() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&show_info(), RUNNING_INFO);
        let vbox = context(&runner);

        let memory = Regex::new(r"memory=(\d+)").unwrap();
        let name = Regex::new(r#"name="([^"]+)""#).unwrap();
        let vram = Regex::new(r"vram=(\d+)").unwrap();

        assert_eq!(vbox.vm_info_by_regex(&memory), "8192");
        assert_eq!(vbox.vm_info_by_regex(&name), "exam");
        assert_eq!(vbox.vm_info_by_regex(&vram), "");
        assert_eq!(runner.call_count(&show_info()), 1);
    }

    #[test]
    fn test_vm_info_failure_cached_as_empty() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.fail(&show_info(), NOT_INSTALLED);
        let vbox = context(&runner);

        let memory = Regex::new(r"memory=(\d+)").unwrap();
        assert_eq!(vbox.vm_info_by_regex(&memory), "");
        assert_eq!(vbox.vm_info(), "");
        assert_eq!(runner.call_count(&show_info()), 1);
    }

    #[test]
    fn test_reset_forces_fresh_invocation() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&VBoxCommand::version(), "7.0.10r158379\n");
        let vbox = context(&runner);

        vbox.version().unwrap();
        vbox.reset_response_cache();
        vbox.version().unwrap();
        assert_eq!(runner.total_calls(), 2);
    }

    fn fake_program(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let program = dir.path().join("VBoxManage");
        std::fs::write(&program, b"").unwrap();
        program
    }

    fn context_at(program: &std::path::Path, runner: &Arc<ScriptedRunner>) -> VBoxManage {
        let runner: Arc<dyn ProcessRunner> = runner.clone();
        VBoxManage::with_runner(&VBoxConfig::for_vm("exam"), program, runner).unwrap()
    }

    #[test]
    fn test_vboxmanage_installed_requires_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_program(&dir);

        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&VBoxCommand::version(), "7.0.10r158379\n");
        assert!(context_at(&program, &runner).is_vboxmanage_installed());

        let silent = Arc::new(ScriptedRunner::new());
        assert!(!context_at(&program, &silent).is_vboxmanage_installed());
    }

    #[test]
    fn test_vboxmanage_installed_accepts_unusual_version_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_program(&dir);
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(
            &VBoxCommand::version(),
            "WARNING: The vboxdrv kernel module is not loaded.\n7.0.10r158379\n",
        );
        let vbox = context_at(&program, &runner);

        assert!(vbox.is_vboxmanage_installed());
        assert!(vbox.version().is_err());
    }

    #[test]
    fn test_vboxmanage_installed_runs_cli_every_time() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_program(&dir);
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&VBoxCommand::version(), "7.0.10r158379\n");
        runner.fail(&VBoxCommand::version(), "VBoxManage: error: VBoxSVC is not running");
        let vbox = context_at(&program, &runner);

        assert!(vbox.is_vboxmanage_installed());
        assert!(!vbox.is_vboxmanage_installed());
        assert_eq!(runner.total_calls(), 2);
    }

    #[test]
    fn test_vboxmanage_installed_ignores_cached_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = fake_program(&dir);
        let runner = Arc::new(ScriptedRunner::new());
        runner.succeed(&VBoxCommand::version(), "7.0.10r158379\n");
        runner.fail(&VBoxCommand::version(), "VBoxManage: error: VBoxSVC is not running");
        let vbox = context_at(&program, &runner);

        assert_eq!(vbox.version().unwrap(), semver::Version::new(7, 0, 10));
        assert!(!vbox.is_vboxmanage_installed());
    }
}
