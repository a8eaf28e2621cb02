// crates/token-gate-core/src/verifier.rs
// ============================================================================
// Module: Upstream Verifier Contracts
// Description: Traits and wire types for remote credential verification.
// Purpose: Depend on verifier contracts, not their implementations.
// Dependencies: async-trait, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The gateway core depends on two independent verification strategies only
//! at their interface boundary: OAuth token introspection and API-key
//! verification. Implementations must surface transport failures and
//! non-success upstream statuses as [`VerifierError`] values, never as a
//! fabricated "inactive" or "invalid" response.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::AuthResult;

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// OAuth introspection response (RFC 7662 subset).
///
/// # Invariants
/// - `active = false` is a definitive credential rejection, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    /// Whether the token is currently valid.
    pub active: bool,
    /// Subject claim identifying the principal.
    #[serde(default)]
    pub sub: Option<String>,
    /// Client identifier the token was issued to.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Space-delimited granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
    /// Expiry as epoch seconds.
    #[serde(default)]
    pub exp: Option<i64>,
}

/// API-key verification response.
///
/// # Invariants
/// - `valid = false` is a definitive credential rejection, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyVerification {
    /// Whether the key is valid.
    pub valid: bool,
    /// Rejection reason supplied by the verifier.
    #[serde(default)]
    pub error: Option<String>,
    /// Identifier of the verified key or its owner.
    #[serde(default)]
    pub key_id: Option<String>,
    /// Whether the key is restricted to non-mutating operations.
    #[serde(default)]
    pub read_only: Option<bool>,
    /// Administrative privilege flag when asserted by the verifier.
    #[serde(default)]
    pub is_admin: Option<bool>,
    /// Additional identity fields passed through verbatim.
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, Value>>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transport-level verifier failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    /// Network or connection failure reaching the upstream endpoint.
    #[error("transport failure: {0}")]
    Transport(String),
    /// Upstream returned a non-success HTTP status.
    #[error("upstream returned status {0}")]
    Status(u16),
    /// Upstream response body could not be decoded.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Traits
// ============================================================================

/// OAuth token introspection contract.
#[async_trait]
pub trait OauthIntrospector: Send + Sync {
    /// Asks the identity provider whether the token is active and what
    /// claims it carries.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] on transport failure or non-success status.
    async fn introspect(&self, token: &str) -> Result<IntrospectionResponse, VerifierError>;
}

/// API-key verification contract.
#[async_trait]
pub trait ApiKeyValidator: Send + Sync {
    /// Asks the verification endpoint whether the key is valid.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError`] on transport failure or non-success status.
    async fn verify_key(&self, key: &str) -> Result<KeyVerification, VerifierError>;
}

/// Full credential verification: classification, dispatch, and context
/// construction folded into a single fail-closed call.
///
/// Implementations never propagate errors; every outcome is an
/// [`AuthResult`].
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies a bearer credential and produces an authentication outcome.
    async fn verify(&self, credential: &str) -> AuthResult;
}
