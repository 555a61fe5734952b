//! Shared utilities for exambox
//!
//! Holds the bounded-wait exclusive slot used to serialize hypervisor CLI
//! invocations and the tracing subscriber setup shared by binaries.

pub mod sync;
pub mod tracing;

pub use sync::*;
