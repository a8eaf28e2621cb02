// crates/token-gate-core/src/error.rs
// ============================================================================
// Module: Authentication Errors
// Description: Stable error taxonomy for authentication decisions.
// Purpose: Ensure every rejection carries a machine-readable code.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Authentication outcomes cross the boundary only as [`AuthResult`]; no
//! panic or propagated error ever represents an authentication decision.
//! Transport failures are caught at the verifier boundary and converted into
//! [`AuthError`] values with distinct codes from credential rejections and
//! configuration defects.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::AuthContext;

// ============================================================================
// SECTION: Error Codes
// ============================================================================

/// Stable machine-readable authentication error codes.
///
/// # Invariants
/// - String labels are part of the external contract and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthErrorCode {
    /// Header present but malformed, or credential shape unclassifiable.
    InvalidAuthHeader,
    /// Authentication required but no credential was presented.
    Unauthorized,
    /// Authorization scheme other than bearer.
    UnsupportedAuthScheme,
    /// OAuth verification routed but no OAuth configuration present.
    NoOauthConfig,
    /// API-key verification routed but no API-key configuration present.
    NoApiKeyConfig,
    /// Introspection executed and reported the token inactive.
    InvalidToken,
    /// Verification executed and reported the key invalid.
    InvalidApiKey,
    /// Transport or upstream failure during OAuth introspection.
    IntrospectionError,
    /// Transport or upstream failure during API-key verification.
    VerificationError,
}

impl AuthErrorCode {
    /// Returns the stable wire label for the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::UnsupportedAuthScheme => "UNSUPPORTED_AUTH_SCHEME",
            Self::NoOauthConfig => "NO_OAUTH_CONFIG",
            Self::NoApiKeyConfig => "NO_API_KEY_CONFIG",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::IntrospectionError => "INTROSPECTION_ERROR",
            Self::VerificationError => "VERIFICATION_ERROR",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Error Value
// ============================================================================

/// Failed authentication outcome.
///
/// # Invariants
/// - `code` is stable; `message` is advisory and may change between releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct AuthError {
    /// Stable machine-readable code.
    pub code: AuthErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Optional structured detail map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Value>>,
}

impl AuthError {
    /// Creates an error with a code and message.
    #[must_use]
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error carrying a structured detail map.
    #[must_use]
    pub fn with_details(
        code: AuthErrorCode,
        message: impl Into<String>,
        details: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Authentication outcome: a context on success, an [`AuthError`] otherwise.
pub type AuthResult = Result<AuthContext, AuthError>;

// ============================================================================
// SECTION: Tests
// ============================================================================
