//! Serialized, cached access to `VBoxManage`
//!
//! Every call to the hypervisor CLI goes through one [`VBoxManage`] context:
//! it holds the process-wide serializer slot, the response cache and the
//! process runner. The orchestration layer builds it once at startup and
//! shares it (`&VBoxManage` or `Arc<VBoxManage>`) with every thread.
//!
//! ```text
//! query ─► ResponseCache ─hit─► parsed value
//!             │ miss
//!             ▼
//!       CommandSerializer ─► ProcessRunner ─fail─► DuplicateDiskRemediator
//!             │                    ▲                        │ fixed
//!             │                    └──────── retry once ────┘
//!             ▼
//!        parser ─► ResponseCache ─► caller
//! ```

pub mod executor;
pub mod locate;
pub mod parser;
pub mod queries;
pub mod remediation;
pub mod runner;
pub mod serializer;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use executor::VBoxManage;
pub use locate::locate_vboxmanage;
pub use remediation::{DuplicateDisk, DuplicateDiskRemediator};
pub use runner::{InvocationResult, ProcessRunner, SystemProcessRunner};
pub use serializer::CommandSerializer;

pub use exambox_core::{Error, Result, VBoxCommand, VmState};
pub use semver::Version;
