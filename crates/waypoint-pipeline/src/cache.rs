//! Process-local result cache with lazy TTL expiry.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use waypoint_core::PipelineResult;

/// Separates the normalized query from `top_k` in the hashed key material.
const KEY_SEPARATOR: u8 = 0x1f;

/// Fingerprint of a `(query, top_k)` pair.
///
/// The query is trimmed, internal whitespace is collapsed and the text is
/// lowercased before hashing, so trivially different spellings share a key.
pub fn cache_key(query: &str, top_k: usize) -> String {
    let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();

    let mut hasher = blake3::Hasher::new();
    hasher.update(normalized.as_bytes());
    hasher.update(&[KEY_SEPARATOR]);
    hasher.update(top_k.to_string().as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// `[pipeline.cache]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// Snapshot returned by `Orchestrator::cache_stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub enabled: bool,
    pub size: usize,
    pub ttl_secs: u64,
}

struct CacheEntry {
    result: PipelineResult,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// TTL-bound map from cache key to pipeline result.
///
/// One mutex guards the map; it is never held across an await point.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry. An expired entry is removed and reported absent.
    pub fn get(&self, key: &str) -> Option<PipelineResult> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(self.ttl) => {
                entries.remove(key);
                tracing::debug!(key, "Cache entry expired");
                None
            }
            Some(entry) => Some(entry.result.clone()),
            None => None,
        }
    }

    /// Store a result, replacing any previous entry under the same key.
    pub fn put(&self, key: String, result: PipelineResult) {
        let entry = CacheEntry {
            result,
            inserted_at: Instant::now(),
        };
        self.lock().insert(key, entry);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of unexpired entries.
    pub fn len(&self) -> usize {
        self.lock()
            .values()
            .filter(|entry| !entry.is_expired(self.ttl))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-updated, so a
    // poisoned mutex is still safe to use.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
