// crates/token-gate/src/lib.rs
// ============================================================================
// Module: Token Gate
// Description: Assembled bearer-credential authentication gateway.
// Purpose: Wire configuration, providers, caching, and routing together.
// Dependencies: thiserror, token-gate-core, token-gate-cache,
//               token-gate-config, token-gate-providers
// ============================================================================

//! ## Overview
//! Token Gate is the assembly crate: it turns a validated [`AuthConfig`]
//! into a ready [`AuthGateway`] backed by HTTP verifier providers and a
//! deduplicating credential cache. Embedders hand the gateway each request's
//! authorization header value and receive a fail-closed [`AuthResult`].
//!
//! ```no_run
//! use token_gate::build_gateway;
//! use token_gate_core::AuthConfig;
//!
//! # async fn example() -> Result<(), token_gate::GateError> {
//! let config = AuthConfig::default();
//! let gateway = build_gateway(&config)?;
//! let outcome = gateway.authenticate(Some("Bearer sk-live-1")).await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod gate;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gate::GateError;
pub use gate::build_gateway;
pub use gate::build_gateway_with_audit;
pub use gate::load_gateway;
pub use token_gate_cache::CacheStats;
pub use token_gate_cache::CachedAuthenticator;
pub use token_gate_cache::TokenCache;
pub use token_gate_config::ConfigError;
pub use token_gate_core::AuthConfig;
pub use token_gate_core::AuthContext;
pub use token_gate_core::AuthError;
pub use token_gate_core::AuthErrorCode;
pub use token_gate_core::AuthGateway;
pub use token_gate_core::AuthKind;
pub use token_gate_core::AuthResult;
pub use token_gate_core::TrustMode;
