// crates/token-gate-core/src/token.rs
// ============================================================================
// Module: Token Classifier
// Description: Shape-based classification of bearer credentials.
// Purpose: Route credentials to the correct verification strategy.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Classification is purely syntactic: a structured token has the
//! three-segment shape of a self-contained signed token, and the two
//! recognized key prefixes denote distinct API-key families. No cryptographic
//! verification happens here. The classifier is total; every string has a
//! defined classification, defaulting to [`TokenKind::Unknown`].

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Prefix identifying secret API keys.
pub const SECRET_KEY_PREFIX: &str = "sk-";
/// Prefix identifying service API keys.
pub const SERVICE_KEY_PREFIX: &str = "svc-";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Syntactic classification of a bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Three dot-separated segments (header/payload/signature shape).
    Structured,
    /// Secret API key (`sk-` prefix).
    SecretKey,
    /// Service API key (`svc-` prefix).
    ServiceKey,
    /// No recognized shape; treated as an opaque bearer token candidate.
    Unknown,
}

impl TokenKind {
    /// Returns a stable label for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::SecretKey => "secret-key",
            Self::ServiceKey => "service-key",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true when the kind routes to the API-key verification path.
    #[must_use]
    pub const fn is_api_key(self) -> bool {
        matches!(self, Self::SecretKey | Self::ServiceKey)
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies a credential by shape.
///
/// The three-segment shape wins over prefix matches: a credential shaped
/// `a.b.c` is structured even when it starts with a key prefix.
#[must_use]
pub fn classify(credential: &str) -> TokenKind {
    if credential.split('.').count() == 3 {
        return TokenKind::Structured;
    }
    if credential.starts_with(SECRET_KEY_PREFIX) {
        return TokenKind::SecretKey;
    }
    if credential.starts_with(SERVICE_KEY_PREFIX) {
        return TokenKind::ServiceKey;
    }
    TokenKind::Unknown
}

// ============================================================================
// SECTION: Tests
// ============================================================================
