// crates/token-gate-cache/src/authenticator.rs
// ============================================================================
// Module: Cached Authenticator
// Description: Caching, deduplicating wrapper over an upstream verifier.
// Purpose: Collapse concurrent verifications of one credential into one call.
// Dependencies: async-trait, tokio, token-gate-core
// ============================================================================

//! ## Overview
//! [`CachedAuthenticator`] front-ends an upstream
//! [`TokenVerifier`] with the bounded cache from this crate plus an
//! in-flight table. At most one upstream verification runs per credential at
//! a time; concurrent callers attach to the in-flight result through a watch
//! channel. Successful verifications are cached; failures are broadcast to
//! waiters but never cached, so the next request re-verifies. The in-flight
//! entry for a credential is removed exactly once, by the task that ran the
//! verification: before the broadcast on the normal path, via a guard when
//! the flight terminates abnormally.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use async_trait::async_trait;
use tokio::sync::watch;

use token_gate_core::AuthContext;
use token_gate_core::AuthError;
use token_gate_core::AuthErrorCode;
use token_gate_core::AuthResult;
use token_gate_core::CacheConfig;
use token_gate_core::TokenVerifier;

use crate::cache::CacheStats;
use crate::cache::TokenCache;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Shared slot broadcasting the outcome of one in-flight verification.
type FlightSlot = watch::Receiver<Option<AuthResult>>;

/// Map of credentials with a verification currently in flight.
type FlightTable = Mutex<HashMap<String, FlightSlot>>;

/// Caching, deduplicating authenticator.
///
/// # Invariants
/// - At most one upstream verification is in flight per credential.
/// - Only `Ok` outcomes enter the cache; errors are never cached.
/// - Cloning shares the cache and the in-flight table.
#[derive(Clone)]
pub struct CachedAuthenticator {
    /// Upstream verifier performing the actual credential checks.
    verifier: Arc<dyn TokenVerifier>,
    /// Successful-verification cache keyed by raw credential.
    cache: Arc<TokenCache<AuthContext>>,
    /// Credentials with a verification currently in flight.
    pending: Arc<FlightTable>,
}

// ============================================================================
// SECTION: Implementation
// ============================================================================

impl CachedAuthenticator {
    /// Creates an authenticator with a fresh cache sized by `config`.
    #[must_use]
    pub fn new(verifier: Arc<dyn TokenVerifier>, config: CacheConfig) -> Self {
        Self::with_cache(verifier, Arc::new(TokenCache::new(config)))
    }

    /// Creates an authenticator over an existing cache.
    #[must_use]
    pub fn with_cache(verifier: Arc<dyn TokenVerifier>, cache: Arc<TokenCache<AuthContext>>) -> Self {
        Self {
            verifier,
            cache,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Verifies a credential through the cache and in-flight table.
    ///
    /// A cached context is returned immediately. Otherwise the caller either
    /// attaches to an in-flight verification of the same credential or
    /// becomes the leader and starts one. The verification itself runs on a
    /// spawned task so an attached caller going away cannot cancel it for
    /// the others.
    pub async fn authenticate(&self, credential: &str) -> AuthResult {
        if let Some(context) = self.cache.get(credential) {
            return Ok(context);
        }
        match self.join_or_lead(credential) {
            Flight::Attached(slot) => await_broadcast(slot).await,
            Flight::Leader(publish) => self.run_flight(credential.to_string(), publish).await,
        }
    }

    /// Returns cache counters and the live entry count.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drops all cached contexts and resets cache counters.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Evicts one credential from the cache.
    pub fn invalidate(&self, credential: &str) {
        self.cache.remove(credential);
    }

    /// Attaches to an existing flight or registers a new one.
    fn join_or_lead(&self, credential: &str) -> Flight {
        let mut pending = lock_pending(&self.pending);
        if let Some(slot) = pending.get(credential) {
            return Flight::Attached(slot.clone());
        }
        let (publish, slot) = watch::channel(None);
        pending.insert(credential.to_string(), slot);
        Flight::Leader(publish)
    }

    /// Runs the upstream verification as the flight leader.
    ///
    /// Ordering inside the task is load-bearing: the success is cached, then
    /// the in-flight entry is removed, then the result is broadcast. A
    /// waiter woken by the broadcast therefore never re-registers a flight
    /// for a credential that is already resolved. The removal is guarded so
    /// a flight that unwinds or is dropped mid-verification still clears its
    /// entry; the next request for that credential starts a fresh flight
    /// instead of waiting on a dead one.
    async fn run_flight(&self, credential: String, publish: watch::Sender<Option<AuthResult>>) -> AuthResult {
        let verifier = Arc::clone(&self.verifier);
        let cache = Arc::clone(&self.cache);
        let pending = Arc::clone(&self.pending);
        let handle = tokio::spawn(async move {
            let mut guard = FlightGuard::new(pending, credential.clone());
            let result = verifier.verify(&credential).await;
            if let Ok(context) = &result {
                cache.insert(credential.clone(), context.clone());
            }
            guard.complete();
            let _ = publish.send(Some(result.clone()));
            result
        });
        match handle.await {
            Ok(result) => result,
            Err(join_error) => Err(AuthError::new(
                AuthErrorCode::VerificationError,
                format!("verification task failed: {join_error}"),
            )),
        }
    }
}

#[async_trait]
impl TokenVerifier for CachedAuthenticator {
    async fn verify(&self, credential: &str) -> AuthResult {
        self.authenticate(credential).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Caller role for one credential's verification.
enum Flight {
    /// Another caller is already verifying; wait on its broadcast.
    Attached(FlightSlot),
    /// This caller registered the flight and must run it.
    Leader(watch::Sender<Option<AuthResult>>),
}

/// Removes one credential's in-flight entry when the flight ends.
///
/// # Invariants
/// - The entry is removed exactly once: on the normal path via
///   [`FlightGuard::complete`], otherwise on drop when the flight unwinds
///   or its task is dropped.
struct FlightGuard {
    /// Shared in-flight table.
    pending: Arc<FlightTable>,
    /// Credential to remove; taken on first removal.
    credential: Option<String>,
}

impl FlightGuard {
    /// Arms a guard for one credential's flight.
    fn new(pending: Arc<FlightTable>, credential: String) -> Self {
        Self {
            pending,
            credential: Some(credential),
        }
    }

    /// Removes the in-flight entry now and disarms the guard.
    fn complete(&mut self) {
        if let Some(credential) = self.credential.take() {
            lock_pending(&self.pending).remove(&credential);
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.complete();
    }
}

/// Waits for the flight leader to broadcast an outcome.
///
/// A closed channel means the leader's task ended without publishing; the
/// waiter fails closed rather than retrying or granting access. The dead
/// flight's entry has already been purged by its guard, so the next
/// request for the credential starts a fresh verification.
async fn await_broadcast(mut slot: FlightSlot) -> AuthResult {
    loop {
        if let Some(result) = slot.borrow().clone() {
            return result;
        }
        if slot.changed().await.is_err() {
            return Err(AuthError::new(
                AuthErrorCode::VerificationError,
                "verification aborted before completion",
            ));
        }
    }
}

/// Locks the in-flight table, absorbing poisoning.
fn lock_pending(pending: &FlightTable) -> MutexGuard<'_, HashMap<String, FlightSlot>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
