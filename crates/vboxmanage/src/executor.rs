//! The shared `VBoxManage` context and its execution path

use crate::locate::locate_vboxmanage;
use crate::remediation::DuplicateDiskRemediator;
use crate::runner::{InvocationResult, ProcessRunner, SystemProcessRunner};
use crate::serializer::CommandSerializer;
use exambox_cache::{CacheConfig, ResponseCache};
use exambox_config::VBoxConfig;
use exambox_core::{Error, Result, VBoxCommand};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One per process: serializer slot, response cache and process runner
pub struct VBoxManage {
    program: PathBuf,
    vm_name: String,
    runner: Arc<dyn ProcessRunner>,
    serializer: CommandSerializer,
    pub(crate) cache: ResponseCache,
    remediator: DuplicateDiskRemediator,
}

impl fmt::Debug for VBoxManage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VBoxManage")
            .field("program", &self.program)
            .field("vm_name", &self.vm_name)
            .field("serializer", &self.serializer)
            .field("cache_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl VBoxManage {
    /// Build the context for the real hypervisor CLI
    ///
    /// Fails when the executable cannot be found or the response cache
    /// cannot be constructed.
    pub fn new(config: &VBoxConfig) -> Result<Self> {
        let program = locate_vboxmanage(config.vboxmanage_path.as_deref())?;
        Self::with_runner(config, program, Arc::new(SystemProcessRunner::new()))
    }

    /// Build the context around a custom process runner
    pub fn with_runner(
        config: &VBoxConfig,
        program: impl Into<PathBuf>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Result<Self> {
        config.validate()?;

        let cache = ResponseCache::new(CacheConfig::new(config.cache_ttl, config.state_ttl))
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to initialise response cache");
                Error::from(e)
            })?;

        let program = program.into();
        tracing::debug!(program = %program.display(), vm = %config.vm_name, "VBoxManage context ready");

        Ok(Self {
            program,
            vm_name: config.vm_name.clone(),
            runner,
            serializer: CommandSerializer::new(config.poll_interval, config.max_wait_attempts),
            cache,
            remediator: DuplicateDiskRemediator::new(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn vm_name(&self) -> &str {
        &self.vm_name
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn serializer(&self) -> &CommandSerializer {
        &self.serializer
    }

    /// Run a command, logging its full output
    pub fn run_command(&self, command: &VBoxCommand) -> Result<String> {
        self.execute(command, true)
    }

    /// Run a command without writing its output to the log
    pub fn run_command_without_logging(&self, command: &VBoxCommand) -> Result<String> {
        self.execute(command, false)
    }

    /// Run commands in order, stopping at the first failure
    pub fn run_commands(&self, commands: &[VBoxCommand]) -> Result<()> {
        for command in commands {
            self.run_command(command)?;
        }
        Ok(())
    }

    /// Serialized run with one duplicate-disk remediation and retry
    pub fn execute(&self, command: &VBoxCommand, log_output: bool) -> Result<String> {
        let argv = self.argv(command);
        let command_line = argv.join(" ");
        self.serializer.serialize(&command_line, || {
            self.run_with_remediation(&argv, &command_line, log_output)
        })
    }

    fn run_with_remediation(
        &self,
        argv: &[String],
        command_line: &str,
        log_output: bool,
    ) -> Result<String> {
        let first = self.invoke(argv, command_line, log_output);
        if first.succeeded {
            return Ok(first.output);
        }

        // Corrective commands bypass the serializer (the slot is already ours)
        // and never trigger remediation themselves.
        let fixed = self.remediator.handle(&first.output, |fix| {
            let fix_argv = self.argv(fix);
            let fix_line = fix_argv.join(" ");
            self.invoke(&fix_argv, &fix_line, true).into_result(&fix_line)
        });

        match fixed {
            Ok(false) => first.into_result(command_line),
            Ok(true) => {
                tracing::debug!(command = %command_line, "Retrying after fixing duplicate hard disk problem");
                self.invoke(argv, command_line, log_output)
                    .into_result(command_line)
            }
            Err(e) => {
                tracing::debug!(command = %command_line, error = %e, "Failed to fix duplicate hard disk problem");
                Err(Error::remediation(command_line, e.to_string()))
            }
        }
    }

    fn invoke(&self, argv: &[String], command_line: &str, log_output: bool) -> InvocationResult {
        tracing::debug!(command = %command_line, "Running VBoxManage");
        let result = self.runner.run_and_get_output(argv);

        if !result.succeeded {
            tracing::debug!(
                command = %command_line,
                detail = result.failure_detail.as_deref().unwrap_or("unknown"),
                "VBoxManage failed"
            );
        }
        if log_output {
            tracing::debug!(command = %command_line, output = %result.output, "VBoxManage output");
        }

        result
    }

    fn argv(&self, command: &VBoxCommand) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(command.iter().cloned())
            .collect()
    }
}
