//! Response cache for exambox
//!
//! A string-keyed, string-valued store where every entry carries its own
//! expiry. Callers pick one of two TTL classes: a long one for slowly
//! changing facts and a short one for the VM running state.

pub mod config;
pub mod entry;
pub mod errors;
pub mod response;

pub use config::{CacheConfig, TtlClass};
pub use entry::{CacheEntry, CacheStats};
pub use errors::{CacheError, Result};
pub use response::ResponseCache;
