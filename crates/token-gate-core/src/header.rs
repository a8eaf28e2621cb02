// crates/token-gate-core/src/header.rs
// ============================================================================
// Module: Authorization Header Parser
// Description: Three-way parse of the transport-level authorization header.
// Purpose: Distinguish missing, malformed, and well-formed credentials.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The header parser yields a three-way result rather than a boolean because
//! downstream policy treats absence and malformation differently: a missing
//! header may be tolerated under permissive trust modes, while a malformed
//! header is always rejected.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum accepted authorization header size in bytes.
pub const MAX_AUTH_HEADER_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Parse state of the transport-level authorization header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedHeader {
    /// No header was present on the request.
    Missing,
    /// Header present but not exactly two space-separated tokens, or
    /// oversized.
    Malformed,
    /// Header split cleanly into a scheme and a credential.
    Valid {
        /// Authorization scheme as presented (case preserved).
        scheme: String,
        /// Credential string following the scheme.
        credential: String,
    },
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses the raw authorization header value, or its absence.
///
/// A header is `Valid` only when it consists of exactly two space-separated
/// non-empty tokens. Doubled, leading, or trailing spaces are malformed;
/// the strictest reading fails closed.
#[must_use]
pub fn parse_authorization(header: Option<&str>) -> ParsedHeader {
    let Some(value) = header else {
        return ParsedHeader::Missing;
    };
    if value.len() > MAX_AUTH_HEADER_BYTES {
        return ParsedHeader::Malformed;
    }
    let mut parts = value.split(' ');
    let (Some(scheme), Some(credential), None) = (parts.next(), parts.next(), parts.next()) else {
        return ParsedHeader::Malformed;
    };
    if scheme.is_empty() || credential.is_empty() {
        return ParsedHeader::Malformed;
    }
    ParsedHeader::Valid {
        scheme: scheme.to_string(),
        credential: credential.to_string(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
