// crates/token-gate-core/src/context.rs
// ============================================================================
// Module: Authentication Context
// Description: Authenticated identity attached to a request.
// Purpose: Carry the principal, privilege flags, and provider claims.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! This module defines [`AuthContext`], the immutable value object produced by
//! a successful authentication attempt. Contexts are either returned fresh
//! from a verifier or returned as a cached copy of a prior successful result;
//! they are never mutated in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Principal identifier used for anonymous access.
pub const ANONYMOUS_ID: &str = "anonymous";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Authentication strategy that produced a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthKind {
    /// Unauthenticated access permitted by the trust policy.
    Anonymous,
    /// OAuth bearer token validated via remote introspection.
    Oauth,
    /// API key validated via remote verification.
    ApiKey,
}

impl AuthKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Oauth => "oauth",
            Self::ApiKey => "api-key",
        }
    }
}

/// Authenticated identity attached to a request.
///
/// # Invariants
/// - `kind = Anonymous` implies `read_only = true` and `id = "anonymous"`.
/// - Values are immutable once constructed; cached copies are byte-identical
///   to the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authentication strategy that produced this context.
    pub kind: AuthKind,
    /// Principal identifier.
    pub id: String,
    /// Restricts the caller to non-mutating operations.
    pub read_only: bool,
    /// Administrative privilege flag; `None` when the provider did not assert
    /// it either way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    /// Raw credential retained for downstream calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_token: Option<String>,
    /// Provider-specific claims (granted scopes, expiry, client id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,
}

impl AuthContext {
    /// Builds the anonymous context granted under permissive trust modes.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            kind: AuthKind::Anonymous,
            id: ANONYMOUS_ID.to_string(),
            read_only: true,
            is_admin: None,
            raw_token: None,
            metadata: None,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
