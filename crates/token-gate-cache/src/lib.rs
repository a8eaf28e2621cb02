// crates/token-gate-cache/src/lib.rs
// ============================================================================
// Module: Token Gate Cache
// Description: Verified-credential caching and in-flight deduplication.
// Purpose: Bound upstream verifier load without weakening auth outcomes.
// Dependencies: async-trait, tokio, token-gate-core
// ============================================================================

//! ## Overview
//! Token Gate Cache supplies two layers: [`TokenCache`], a bounded TTL cache
//! with oldest-first eviction, and [`CachedAuthenticator`], which wraps an
//! upstream [`token_gate_core::TokenVerifier`] so that concurrent requests
//! carrying the same credential share a single upstream verification call.
//! Only successful verifications are cached; failures are always re-verified.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod authenticator;
pub mod cache;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use authenticator::CachedAuthenticator;
pub use cache::CacheStats;
pub use cache::TokenCache;
