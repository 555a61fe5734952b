//! Cache configuration

use crate::errors::{CacheError, Result};
use exambox_core::{DEFAULT_CACHE_TTL, DEFAULT_STATE_TTL};
use std::time::Duration;

/// Largest single value accepted by default (1 MiB)
const DEFAULT_MAX_VALUE_BYTES: usize = 1024 * 1024;

/// Which expiry an entry gets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlClass {
    /// Hypervisor version, guest properties, static VM info
    Long,
    /// VM running/stopped state
    Short,
}

/// Response cache configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL for [`TtlClass::Long`]
    pub long_ttl: Duration,
    /// TTL for [`TtlClass::Short`]
    pub short_ttl: Duration,
    /// Values above this size are refused by `set`
    pub max_value_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            long_ttl: DEFAULT_CACHE_TTL,
            short_ttl: DEFAULT_STATE_TTL,
            max_value_bytes: DEFAULT_MAX_VALUE_BYTES,
        }
    }
}

impl CacheConfig {
    pub fn new(long_ttl: Duration, short_ttl: Duration) -> Self {
        Self {
            long_ttl,
            short_ttl,
            ..Self::default()
        }
    }

    /// TTL for the given class
    pub fn ttl(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Long => self.long_ttl,
            TtlClass::Short => self.short_ttl,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.long_ttl.is_zero() || self.short_ttl.is_zero() {
            return Err(CacheError::configuration("ttl must be greater than zero"));
        }
        if self.max_value_bytes == 0 {
            return Err(CacheError::configuration(
                "max value size must be greater than zero",
            ));
        }
        Ok(())
    }
}
