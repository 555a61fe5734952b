//! Recovery from duplicate hard disk registrations
//!
//! VirtualBox refuses to register a disk whose UUID is already known under a
//! different path, which typically happens after a VM directory was removed
//! by hand. The stale registration is closed so the original command can be
//! retried once.

use exambox_core::{Error, Result, VBoxCommand};

use crate::parser;

/// Disks named by a "Cannot register the hard disk" diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateDisk {
    /// Disk the failed command tried to register
    pub new_path: String,
    pub new_uuid: String,
    /// Disk already registered under the conflicting UUID
    pub registered_path: String,
    pub uuid: String,
}

/// Detects the duplicate hard disk diagnostic and closes the stale medium
#[derive(Debug, Default, Clone, Copy)]
pub struct DuplicateDiskRemediator;

impl DuplicateDiskRemediator {
    pub fn new() -> Self {
        Self
    }

    /// Commands that clear the stale registration
    pub fn corrective_commands(disk: &DuplicateDisk) -> Vec<VBoxCommand> {
        vec![VBoxCommand::close_medium_disk(&disk.uuid)]
    }

    /// Inspect a failed run's output and fix the problem when it is ours
    ///
    /// Returns `Ok(false)` when the diagnostic is absent, `Ok(true)` once the
    /// corrective commands succeeded, and an error when the diagnostic was
    /// present but could not be parsed or a corrective command failed.
    /// `run` must invoke the CLI directly, never through the remediating path.
    pub fn handle<F>(&self, failed_output: &str, mut run: F) -> Result<bool>
    where
        F: FnMut(&VBoxCommand) -> Result<String>,
    {
        if !parser::has_duplicate_hard_disk(failed_output) {
            return Ok(false);
        }

        let disk = parser::duplicate_hard_disk(failed_output)
            .ok_or_else(|| Error::parse("duplicate hard disk path and uuid", failed_output))?;

        tracing::debug!(
            new_path = %disk.new_path,
            registered_path = %disk.registered_path,
            uuid = %disk.uuid,
            "Detected duplicate hard disk registration, closing stale medium"
        );

        for command in Self::corrective_commands(&disk) {
            run(&command)?;
            tracing::debug!(command = %command, "Corrective command succeeded");
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUPLICATE_OUTPUT: &str = "VBoxManage: error: Cannot register the hard disk \
        '/home/user/VirtualBox VMs/exam/disk.vdi' {11111111-2222-3333-4444-555555555555} \
        because a hard disk '/home/user/stale/disk.vdi' with UUID \
        {11111111-2222-3333-4444-555555555555} already exists";

    #[test]
    fn test_unrelated_failure_not_handled() {
        let mut calls = 0;
        let fixed = DuplicateDiskRemediator
            .handle("VBoxManage: error: E_ACCESSDENIED", |_| {
                calls += 1;
                Ok(String::new())
            })
            .unwrap();

        assert!(!fixed);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_duplicate_disk_closed_by_uuid() {
        let mut issued = Vec::new();
        let fixed = DuplicateDiskRemediator
            .handle(DUPLICATE_OUTPUT, |command| {
                issued.push(command.clone());
                Ok(String::new())
            })
            .unwrap();

        assert!(fixed);
        assert_eq!(
            issued,
            vec![VBoxCommand::close_medium_disk(
                "11111111-2222-3333-4444-555555555555"
            )]
        );
    }

    #[test]
    fn test_unparseable_diagnostic_is_error() {
        let mut calls = 0;
        let result = DuplicateDiskRemediator.handle(
            "VBoxManage: error: Cannot register the hard disk (details lost)",
            |_| {
                calls += 1;
                Ok(String::new())
            },
        );

        assert!(matches!(result, Err(Error::Parse { .. })));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_failed_corrective_command_is_error() {
        let result = DuplicateDiskRemediator.handle(DUPLICATE_OUTPUT, |command| {
            Err(Error::invocation(
                command.to_string(),
                "VBoxManage: error: Medium is locked",
                "exit status: 1",
            ))
        });

        let err = result.unwrap_err();
        assert!(err.is_invocation());
        assert!(err.to_string().contains("closemedium"));
    }
}
