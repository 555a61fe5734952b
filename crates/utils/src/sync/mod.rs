//! Synchronization primitives

pub mod slot;

pub use slot::{Acquisition, ExclusiveSlot, PollPolicy, SlotGuard};
