// crates/token-gate-core/src/config.rs
// ============================================================================
// Module: Authentication Configuration Model
// Description: Trust policy, verifier, and cache configuration types.
// Purpose: Define the immutable process-wide authentication settings.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`AuthConfig`] is constructed once at service start and immutable
//! thereafter. Loading and fail-closed validation live in
//! `token-gate-config`; this module only defines the canonical shape so that
//! the router and providers share one source of truth.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default cache entry time-to-live in milliseconds (5 minutes).
pub const DEFAULT_CACHE_TTL_MS: u64 = 300_000;
/// Default maximum number of cache entries.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1_000;
/// Default upstream verifier timeout in milliseconds.
pub const DEFAULT_VERIFIER_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Trust Modes
// ============================================================================

/// Trust policy governing whether unauthenticated access is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TrustMode {
    /// Every request is granted the anonymous context; headers are ignored.
    #[default]
    AnonymousOnly,
    /// Missing credentials fall back to anonymous; presented credentials
    /// must verify.
    AnonymousOrAuthenticated,
    /// Every request must present a verifiable credential.
    AuthenticationRequired,
}

impl TrustMode {
    /// Returns the stable configuration label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AnonymousOnly => "anonymous-only",
            Self::AnonymousOrAuthenticated => "anonymous-or-authenticated",
            Self::AuthenticationRequired => "authentication-required",
        }
    }
}

// ============================================================================
// SECTION: Verifier Configuration
// ============================================================================

/// OAuth introspection endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OauthConfig {
    /// Token introspection endpoint URL.
    pub introspection_url: String,
    /// Client identifier for HTTP basic authentication.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Client secret for HTTP basic authentication.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default = "default_verifier_timeout_ms")]
    pub timeout_ms: u64,
}

/// API-key verification endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyConfig {
    /// Key verification endpoint URL.
    pub verify_url: String,
    /// Request timeout in milliseconds.
    #[serde(default = "default_verifier_timeout_ms")]
    pub timeout_ms: u64,
}

// ============================================================================
// SECTION: Cache Configuration
// ============================================================================

/// Token cache sizing and expiry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Default entry time-to-live in milliseconds.
    #[serde(default = "default_cache_ttl_ms")]
    pub ttl_ms: u64,
    /// Maximum number of entries retained.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_CACHE_TTL_MS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

// ============================================================================
// SECTION: Top-Level Configuration
// ============================================================================

/// Process-wide authentication configuration.
///
/// # Invariants
/// - A mode other than anonymous-only that routes to a verifier must have
///   that verifier's section present; routing otherwise fails with a
///   configuration error code, never a silent grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    /// Trust policy for inbound requests.
    #[serde(default)]
    pub mode: TrustMode,
    /// OAuth introspection settings when OAuth verification is available.
    #[serde(default)]
    pub oauth: Option<OauthConfig>,
    /// API-key verification settings when key verification is available.
    #[serde(default)]
    pub api_key: Option<ApiKeyConfig>,
    /// Token cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Allow cleartext `http://` verifier URLs (loopback testing only).
    #[serde(default)]
    pub allow_http: bool,
}

// ============================================================================
// SECTION: Serde Defaults
// ============================================================================

/// Serde default for verifier timeouts.
const fn default_verifier_timeout_ms() -> u64 {
    DEFAULT_VERIFIER_TIMEOUT_MS
}

/// Serde default for cache TTL.
const fn default_cache_ttl_ms() -> u64 {
    DEFAULT_CACHE_TTL_MS
}

/// Serde default for cache capacity.
const fn default_cache_max_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only assertions use unwrap for clarity."
    )]

    use super::*;

    #[test]
    fn trust_mode_labels_are_kebab_case() {
        assert_eq!(TrustMode::AnonymousOnly.as_str(), "anonymous-only");
        assert_eq!(TrustMode::AnonymousOrAuthenticated.as_str(), "anonymous-or-authenticated");
        assert_eq!(TrustMode::AuthenticationRequired.as_str(), "authentication-required");
    }

    #[test]
    fn trust_mode_deserializes_from_labels() {
        let mode: TrustMode =
            serde_json::from_value(serde_json::json!("authentication-required")).expect("mode");
        assert_eq!(mode, TrustMode::AuthenticationRequired);
    }

    #[test]
    fn default_mode_is_anonymous_only() {
        assert_eq!(TrustMode::default(), TrustMode::AnonymousOnly);
    }

    #[test]
    fn cache_defaults_match_contract() {
        let cache = CacheConfig::default();
        assert_eq!(cache.ttl_ms, 300_000);
        assert_eq!(cache.max_entries, 1_000);
    }
}
