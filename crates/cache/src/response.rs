//! In-memory response cache

use crate::config::{CacheConfig, TtlClass};
use crate::entry::{CacheEntry, CacheStats, StatCounters};
use crate::errors::{CacheError, Result};
use dashmap::DashMap;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// String-keyed cache of hypervisor CLI responses
///
/// Expired entries and never-set keys look the same to callers: both are a
/// miss. Individual writes replace the whole entry atomically; there is no
/// partial update and no per-key invalidation, only [`ResponseCache::reset`].
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    config: CacheConfig,
    stats: StatCounters,
}

impl ResponseCache {
    /// Build an empty cache; an invalid configuration is refused
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: DashMap::new(),
            config,
            stats: StatCounters::default(),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up an unexpired value
    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_expired() {
                drop(entry);
                self.entries.remove_if(key, |_, entry| entry.is_expired());
            } else {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a value, replacing any entry and restarting its expiry from now
    pub fn set(&self, key: &str, value: impl Into<String>, ttl: Duration) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::invalid_key(key, "key must not be empty"));
        }

        let value = value.into();
        if value.len() > self.config.max_value_bytes {
            return Err(CacheError::CapacityExceeded {
                key: key.to_string(),
                requested_bytes: value.len(),
                limit_bytes: self.config.max_value_bytes,
            });
        }

        self.entries
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.stats.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Store a value with the TTL of the given class
    pub fn set_with_class(&self, key: &str, value: impl Into<String>, class: TtlClass) -> Result<()> {
        self.set(key, value, self.config.ttl(class))
    }

    /// Discard every entry, leaving an empty cache
    pub fn reset(&self) {
        self.entries.clear();
        self.stats.resets.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Response cache reset");
    }

    /// Number of stored entries, expired ones included until touched
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
