// crates/token-gate-cache/src/cache.rs
// ============================================================================
// Module: Bounded TTL Cache
// Description: Generic time-bounded cache with oldest-first eviction.
// Purpose: Retain verified credentials for a bounded window under a size cap.
// Dependencies: token-gate-core
// ============================================================================

//! ## Overview
//! [`TokenCache`] maps credential strings to cloneable values under a single
//! mutex. Entries expire after a per-entry time-to-live and are purged lazily
//! on read. When an insert pushes the cache over capacity, the entries with
//! the oldest creation time are evicted first, regardless of how recently
//! they were read. Hit and miss counters accumulate until [`TokenCache::clear`],
//! which drops entries and resets counters in one critical section.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use token_gate_core::CacheConfig;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Cache observability counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups that returned a live entry.
    pub hits: u64,
    /// Lookups that found nothing, or only an expired entry.
    pub misses: u64,
    /// Live (unexpired) entries currently retained.
    pub size: usize,
}

/// One cached value with its expiry and insertion-order bookkeeping.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// Cached value.
    value: V,
    /// Entry creation time; eviction removes the oldest first.
    created_at: Instant,
    /// Insertion sequence number breaking creation-time ties.
    seq: u64,
    /// Instant past which the entry is dead; `None` never expires.
    expires_at: Option<Instant>,
}

/// Mutable cache state guarded by one mutex.
#[derive(Debug)]
struct CacheState<V> {
    /// Keyed entries.
    entries: HashMap<String, CacheEntry<V>>,
    /// Cumulative hit counter.
    hits: u64,
    /// Cumulative miss counter.
    misses: u64,
    /// Next insertion sequence number.
    next_seq: u64,
}

/// Bounded TTL cache keyed by credential string.
///
/// # Invariants
/// - An expired entry is never returned; expiry is checked before capacity.
/// - Eviction removes entries in ascending `(created_at, seq)` order until
///   the configured capacity holds.
/// - Re-inserting a key replaces the entry with a fresh creation time.
#[derive(Debug)]
pub struct TokenCache<V> {
    /// Immutable sizing and expiry settings.
    config: CacheConfig,
    /// Guarded entries and counters.
    state: Mutex<CacheState<V>>,
}

// ============================================================================
// SECTION: Implementation
// ============================================================================

impl<V: Clone> TokenCache<V> {
    /// Creates a cache with the given sizing and expiry settings.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
                next_seq: 0,
            }),
        }
    }

    /// Returns the configured sizing and expiry settings.
    #[must_use]
    pub const fn config(&self) -> CacheConfig {
        self.config
    }

    /// Looks up a live entry, counting a hit or a miss.
    ///
    /// An entry whose time-to-live has elapsed is removed and counted as a
    /// miss. Lookups never extend an entry's lifetime or eviction priority.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut state = self.lock_state();
        purge_expired(&mut state, now);
        if let Some(entry) = state.entries.get(key) {
            let value = entry.value.clone();
            state.hits = state.hits.saturating_add(1);
            Some(value)
        } else {
            state.misses = state.misses.saturating_add(1);
            None
        }
    }

    /// Inserts a value under the configured default time-to-live.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.insert_with_ttl(key, value, Duration::from_millis(self.config.ttl_ms));
    }

    /// Inserts a value under an explicit time-to-live.
    ///
    /// Replacing an existing key resets its creation time, sending it to the
    /// back of the eviction order. If the insert exceeds capacity, the
    /// oldest entries are evicted until the cap holds. A time-to-live too
    /// large to represent as an expiry instant never expires; the entry
    /// remains subject to capacity eviction.
    pub fn insert_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut state = self.lock_state();
        let seq = state.next_seq;
        state.next_seq = state.next_seq.wrapping_add(1);
        state.entries.insert(
            key.into(),
            CacheEntry {
                value,
                created_at: now,
                seq,
                expires_at: now.checked_add(ttl),
            },
        );
        evict_to_capacity(&mut state, self.config.max_entries);
    }

    /// Removes an entry if present.
    pub fn remove(&self, key: &str) {
        let mut state = self.lock_state();
        state.entries.remove(key);
    }

    /// Drops all entries and resets the hit and miss counters.
    ///
    /// The drop and the reset happen in one critical section so observers
    /// never see cleared entries alongside stale counters.
    pub fn clear(&self) {
        let mut state = self.lock_state();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }

    /// Returns counters and the live entry count.
    ///
    /// Expired entries are purged first so `size` reflects only live
    /// entries.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let mut state = self.lock_state();
        purge_expired(&mut state, now);
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            size: state.entries.len(),
        }
    }

    /// Locks the state, absorbing poisoning.
    ///
    /// Every critical section leaves the state internally consistent, so a
    /// panic mid-section cannot corrupt it; recovering the guard is safe.
    fn lock_state(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for TokenCache<V> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Removes entries whose expiry has passed.
fn purge_expired<V>(state: &mut CacheState<V>, now: Instant) {
    state.entries.retain(|_, entry| entry.expires_at.is_none_or(|expires_at| expires_at > now));
}

/// Evicts oldest-created entries until the capacity holds.
fn evict_to_capacity<V>(state: &mut CacheState<V>, max_entries: usize) {
    while state.entries.len() > max_entries {
        let oldest = state
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.created_at, entry.seq))
            .map(|(key, _)| key.clone());
        let Some(key) = oldest else {
            return;
        };
        state.entries.remove(&key);
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
