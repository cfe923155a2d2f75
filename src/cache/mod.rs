//! Result cache
//!
//! Generic key-value cache contract used to memoize resolved provider
//! configurations and fetched trial data. Backends are expected to be
//! unreliable: every caller treats a failed read as a miss and a failed
//! write as a no-op.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

/// Key-value cache contract
///
/// `get` returns `Ok(None)` on a miss. Backend failures surface as `Err` so
/// callers can decide how to degrade; no caller in this crate propagates them.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process cache backend
///
/// Bounded by a simple clear-when-full policy rather than an eviction order.
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
    max_entries: usize,
}

impl MemoryCache {
    /// Create a cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Create a cache that clears itself once `max_entries` is exceeded
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("Cache hit for key: {}", key);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("cache lock poisoned"))?;
        if entries.len() >= self.max_entries {
            entries.clear();
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
