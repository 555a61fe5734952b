//! Process-wide serialization of hypervisor CLI invocations
//!
//! Concurrent `VBoxManage` runs from one process tend to fail with
//! `E_ACCESSDENIED`, so invocations take turns through a single slot. The wait
//! is bounded: after the poll ceiling a caller runs anyway, unsynchronized,
//! and a warning is logged. A hung CLI therefore delays other callers by at
//! most the ceiling instead of blocking them forever.

use exambox_utils::{Acquisition, ExclusiveSlot, PollPolicy};
use std::time::Duration;

/// Gate that lets one hypervisor CLI invocation run at a time
#[derive(Debug, Default)]
pub struct CommandSerializer {
    slot: ExclusiveSlot,
    policy: PollPolicy,
}

impl CommandSerializer {
    pub fn new(poll_interval: Duration, max_attempts: u32) -> Self {
        Self::with_policy(PollPolicy::new(poll_interval, max_attempts))
    }

    pub fn with_policy(policy: PollPolicy) -> Self {
        Self {
            slot: ExclusiveSlot::new(),
            policy,
        }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Whether an invocation currently holds the slot
    pub fn is_busy(&self) -> bool {
        self.slot.is_held()
    }

    /// Run `f` while holding the slot, or without it once the wait ceiling is hit
    ///
    /// The slot is released when `f` returns or unwinds.
    pub fn serialize<T>(&self, command_line: &str, f: impl FnOnce() -> T) -> T {
        match self.slot.acquire_bounded(self.policy) {
            Acquisition::Held(_guard) => f(),
            Acquisition::FailOpen {
                attempts,
                held_since,
            } => {
                tracing::warn!(
                    command = %command_line,
                    attempts,
                    held_for_ms = held_since.map(|t| t.elapsed().as_millis() as u64),
                    "Previous VBoxManage call still running after wait ceiling, running without exclusive access"
                );
                f()
            }
        }
    }
}
