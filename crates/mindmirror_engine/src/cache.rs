//! TTL-bounded, size-bounded response cache shared across resolvers.
//!
//! Purely an optimization layer: a miss never changes correctness, only
//! latency and provider cost. One instance is constructed per process and
//! handed to every resolver, so tests can isolate their own.

use lru::LruCache;
use mindmirror_common::{Capability, CapabilityResult, DegradationTier};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Soft cap on live entries.
pub const DEFAULT_SIZE_BOUND: usize = 100;

/// Default TTL for provider results and composite pipeline stages.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Reflection text is expensive and slow-moving; keep it much longer.
pub const REFLECTION_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Local fallbacks are cheap to regenerate; keep them briefly.
pub const LOCAL_TIER_TTL: Duration = Duration::from_secs(60);

struct Entry {
    result: CapabilityResult,
    expires_at: Instant,
}

/// Key -> result store with lazy expiry and LRU eviction past the bound.
pub struct ResponseCache {
    inner: Mutex<LruCache<String, Entry>>,
    size_bound: usize,
}

impl ResponseCache {
    pub fn new(size_bound: usize) -> Self {
        Self {
            inner: Mutex::new(LruCache::unbounded()),
            // A zero bound would force evicting the entry being inserted.
            size_bound: size_bound.max(1),
        }
    }

    /// Stable key from capability + raw input + full (ordered) context.
    pub fn cache_key(
        capability: Capability,
        raw_input: &str,
        context: &BTreeMap<String, String>,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(capability.to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(raw_input.as_bytes());
        for (key, value) in context {
            hasher.update([0u8]);
            hasher.update(key.as_bytes());
            hasher.update([0u8]);
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Returns the cached result, evicting it first if expired.
    pub fn get(&self, key: &str) -> Option<CapabilityResult> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        let expired = inner
            .peek(key)
            .map(|entry| Instant::now() >= entry.expires_at)
            .unwrap_or(false);
        if expired {
            inner.pop(key);
            debug!("cache entry expired on read");
            return None;
        }

        inner.get(key).map(|entry| entry.result.clone())
    }

    /// Stores unconditionally, then enforces the soft cap: expired entries
    /// are swept first, then least-recently-used entries go. The entry
    /// inserted by this call is never evicted.
    pub fn put(&self, key: impl Into<String>, result: CapabilityResult, ttl: Duration) {
        let key = key.into();
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        inner.put(
            key,
            Entry {
                result,
                expires_at: Instant::now() + ttl,
            },
        );

        if inner.len() > self.size_bound {
            let now = Instant::now();
            let expired: Vec<String> = inner
                .iter()
                .filter(|(_, entry)| now >= entry.expires_at)
                .map(|(k, _)| k.clone())
                .collect();
            for k in expired {
                inner.pop(&k);
            }

            // The fresh entry is most-recently-used, so pop_lru never
            // touches it while anything else remains.
            while inner.len() > self.size_bound {
                if inner.pop_lru().is_none() {
                    break;
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE_BOUND)
    }
}

/// TTL policy per capability and tier. Minimal-tier entries keep the short
/// default so a recovered provider is retried soon.
pub fn ttl_for(capability: Capability, tier: DegradationTier) -> Duration {
    match tier {
        DegradationTier::Local => LOCAL_TIER_TTL,
        DegradationTier::Minimal => DEFAULT_TTL,
        _ if capability == Capability::Reflection => REFLECTION_TTL,
        _ => DEFAULT_TTL,
    }
}
