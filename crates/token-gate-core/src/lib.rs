// crates/token-gate-core/src/lib.rs
// ============================================================================
// Module: Token Gate Core
// Description: Authentication data model, policy routing, and contracts.
// Purpose: Provide strict, fail-closed credential authentication primitives.
// Dependencies: serde, serde_json, thiserror, async-trait, sha2
// ============================================================================

//! ## Overview
//! Token Gate Core defines the authentication data model ([`AuthContext`],
//! [`AuthError`], [`AuthResult`]), the authorization header parser, the
//! bearer-token classifier, the trust-mode router, and the upstream verifier
//! contracts. All decisions are fail-closed: every code path terminates in an
//! [`AuthResult`], and ambiguous input never grants access.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod header;
pub mod token;
pub mod verifier;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuthAuditEvent;
pub use audit::AuthAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::ApiKeyConfig;
pub use config::AuthConfig;
pub use config::CacheConfig;
pub use config::OauthConfig;
pub use config::TrustMode;
pub use context::AuthContext;
pub use context::AuthKind;
pub use error::AuthError;
pub use error::AuthErrorCode;
pub use error::AuthResult;
pub use gateway::AuthGateway;
pub use gateway::VerifierDispatch;
pub use header::ParsedHeader;
pub use header::parse_authorization;
pub use token::TokenKind;
pub use token::classify;
pub use verifier::ApiKeyValidator;
pub use verifier::IntrospectionResponse;
pub use verifier::KeyVerification;
pub use verifier::OauthIntrospector;
pub use verifier::TokenVerifier;
pub use verifier::VerifierError;
