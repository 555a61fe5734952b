//! Process runner boundary
//!
//! A run yields the combined output and whether the process exited
//! successfully. Nothing here retries or serializes.

use exambox_core::{Error, Result};
use std::process::{Command, Stdio};

/// Outcome of one external process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Combined stdout and stderr
    pub output: String,
    pub succeeded: bool,
    /// Why the run failed (exit status, spawn error)
    pub failure_detail: Option<String>,
}

impl InvocationResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            succeeded: true,
            failure_detail: None,
        }
    }

    pub fn failure(output: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            succeeded: false,
            failure_detail: Some(detail.into()),
        }
    }

    /// Output on success, an invocation error carrying the output otherwise
    pub fn into_result(self, command_line: &str) -> Result<String> {
        if self.succeeded {
            Ok(self.output)
        } else {
            let detail = self
                .failure_detail
                .unwrap_or_else(|| "command failed".to_string());
            Err(Error::invocation(command_line, self.output, detail))
        }
    }
}

/// Trait for executing external commands
///
/// This abstraction allows for testing without spawning processes by
/// providing different implementations for production and test environments.
/// `argv[0]` is the executable.
pub trait ProcessRunner: Send + Sync {
    /// Run to completion and capture combined output
    ///
    /// Fails exactly when the process exits non-zero or cannot be started.
    fn run_and_get_output(&self, argv: &[String]) -> InvocationResult;
}

/// Production implementation that executes real commands
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemProcessRunner {
    fn run_and_get_output(&self, argv: &[String]) -> InvocationResult {
        let Some((program, args)) = argv.split_first() else {
            return InvocationResult::failure("", "empty command line");
        };

        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::null());
        hide_console_window(&mut command);

        match command.output() {
            Ok(output) => {
                // stdout first, then stderr; callers match diagnostics by substring
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));

                if output.status.success() {
                    InvocationResult::success(combined)
                } else {
                    InvocationResult::failure(combined, output.status.to_string())
                }
            }
            Err(e) => InvocationResult::failure("", format!("failed to start {program}: {e}")),
        }
    }
}

#[cfg(windows)]
fn hide_console_window(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_console_window(_command: &mut Command) {}
