// crates/token-gate-providers/src/lib.rs
// ============================================================================
// Module: Token Gate Providers
// Description: HTTP-backed credential verifier implementations.
// Purpose: Implement the upstream verifier contracts over real endpoints.
// Dependencies: async-trait, reqwest, serde_json, token-gate-core
// ============================================================================

//! ## Overview
//! Token Gate Providers implements the verifier contracts from
//! `token-gate-core` against real HTTP endpoints: OAuth token introspection
//! (RFC 7662) and a JSON API-key verification endpoint. Both providers
//! surface transport failures, non-success statuses, and undecodable bodies
//! as [`token_gate_core::VerifierError`] values so the router can translate
//! them into stable error codes. Neither provider ever fabricates a
//! definitive rejection from an upstream failure.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api_key;
pub mod oauth;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api_key::HttpApiKeyValidator;
pub use oauth::HttpOauthIntrospector;
