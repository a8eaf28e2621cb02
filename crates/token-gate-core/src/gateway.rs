// crates/token-gate-core/src/gateway.rs
// ============================================================================
// Module: Auth Mode Router and Verifier Dispatch
// Description: Trust-policy state machine over parsed authorization headers.
// Purpose: Produce fail-closed authentication decisions for every request.
// Dependencies: crate::header, crate::token, crate::verifier, async-trait
// ============================================================================

//! ## Overview
//! The gateway implements the authoritative policy table: anonymous-only
//! short-circuits before the header is inspected, malformed headers are
//! rejected regardless of mode, scheme validation precedes token
//! classification, and classified credentials dispatch to the configured
//! verification strategy. Missing verifier configuration is a configuration
//! defect surfaced distinctly from credential invalidity, never a silent
//! grant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::audit::AuthAuditEvent;
use crate::audit::AuthAuditSink;
use crate::audit::NoopAuditSink;
use crate::config::TrustMode;
use crate::context::AuthContext;
use crate::context::AuthKind;
use crate::error::AuthError;
use crate::error::AuthErrorCode;
use crate::error::AuthResult;
use crate::header::ParsedHeader;
use crate::header::parse_authorization;
use crate::token::TokenKind;
use crate::token::classify;
use crate::verifier::ApiKeyValidator;
use crate::verifier::IntrospectionResponse;
use crate::verifier::KeyVerification;
use crate::verifier::OauthIntrospector;
use crate::verifier::TokenVerifier;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Accepted authorization scheme (matched case-insensitively).
const BEARER_SCHEME: &str = "bearer";
/// Scope granting read access.
const READ_SCOPE: &str = "read";
/// Scope granting administrative privileges.
const ADMIN_SCOPE: &str = "admin";
/// Fallback principal identifier when the provider asserts none.
const UNKNOWN_PRINCIPAL: &str = "unknown";

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Trust-mode router over a credential verifier.
///
/// # Invariants
/// - `authenticate` never panics and never propagates an error; every code
///   path terminates in an [`AuthResult`].
/// - Under [`TrustMode::AnonymousOnly`] the decision ignores the header
///   entirely.
pub struct AuthGateway {
    /// Configured trust policy.
    mode: TrustMode,
    /// Credential verifier invoked for well-formed bearer headers.
    verifier: Arc<dyn TokenVerifier>,
    /// Audit sink receiving one event per decision.
    audit: Arc<dyn AuthAuditSink>,
}

impl fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGateway")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl AuthGateway {
    /// Creates a gateway with a no-op audit sink.
    #[must_use]
    pub fn new(mode: TrustMode, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self::with_audit(mode, verifier, Arc::new(NoopAuditSink))
    }

    /// Creates a gateway recording decisions to the given audit sink.
    #[must_use]
    pub fn with_audit(
        mode: TrustMode,
        verifier: Arc<dyn TokenVerifier>,
        audit: Arc<dyn AuthAuditSink>,
    ) -> Self {
        Self {
            mode,
            verifier,
            audit,
        }
    }

    /// Returns the configured trust mode.
    #[must_use]
    pub const fn mode(&self) -> TrustMode {
        self.mode
    }

    /// Authenticates a request given its raw authorization header value.
    pub async fn authenticate(&self, header: Option<&str>) -> AuthResult {
        let parsed = parse_authorization(header);
        let credential = match &parsed {
            ParsedHeader::Valid {
                credential, ..
            } => Some(credential.clone()),
            ParsedHeader::Missing | ParsedHeader::Malformed => None,
        };
        let result = self.decide(parsed).await;
        match &result {
            Ok(context) => self.audit.record(&AuthAuditEvent::allowed(
                self.mode,
                context,
                credential.as_deref(),
            )),
            Err(error) => self.audit.record(&AuthAuditEvent::denied(
                self.mode,
                error,
                credential.as_deref(),
            )),
        }
        result
    }

    /// Applies the policy table to a parsed header.
    async fn decide(&self, parsed: ParsedHeader) -> AuthResult {
        if self.mode == TrustMode::AnonymousOnly {
            return Ok(AuthContext::anonymous());
        }
        match parsed {
            ParsedHeader::Malformed => Err(AuthError::new(
                AuthErrorCode::InvalidAuthHeader,
                "authorization header must be exactly '<scheme> <credential>'",
            )),
            ParsedHeader::Missing => {
                if self.mode == TrustMode::AnonymousOrAuthenticated {
                    Ok(AuthContext::anonymous())
                } else {
                    Err(AuthError::new(AuthErrorCode::Unauthorized, "authentication required"))
                }
            }
            ParsedHeader::Valid {
                scheme,
                credential,
            } => {
                if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
                    let mut details = BTreeMap::new();
                    details.insert("scheme".to_string(), Value::String(scheme));
                    return Err(AuthError::with_details(
                        AuthErrorCode::UnsupportedAuthScheme,
                        "only the bearer authorization scheme is supported",
                        details,
                    ));
                }
                self.verifier.verify(&credential).await
            }
        }
    }
}

// ============================================================================
// SECTION: Verifier Dispatch
// ============================================================================

/// Routes classified credentials to the configured verification strategy.
///
/// # Invariants
/// - Missing verifier configuration rejects with `NO_OAUTH_CONFIG` /
///   `NO_API_KEY_CONFIG` before any network call.
/// - Unknown token shapes are introspected as opaque bearer candidates only
///   when OAuth is configured; otherwise they are rejected locally.
pub struct VerifierDispatch {
    /// OAuth introspection strategy when configured.
    oauth: Option<Arc<dyn OauthIntrospector>>,
    /// API-key verification strategy when configured.
    api_keys: Option<Arc<dyn ApiKeyValidator>>,
}

impl VerifierDispatch {
    /// Creates a dispatch over the configured strategies.
    #[must_use]
    pub fn new(
        oauth: Option<Arc<dyn OauthIntrospector>>,
        api_keys: Option<Arc<dyn ApiKeyValidator>>,
    ) -> Self {
        Self {
            oauth,
            api_keys,
        }
    }

    /// Verifies a credential along the OAuth introspection path.
    async fn verify_oauth(&self, token: &str) -> AuthResult {
        let Some(introspector) = &self.oauth else {
            return Err(AuthError::new(
                AuthErrorCode::NoOauthConfig,
                "oauth verification is not configured",
            ));
        };
        match introspector.introspect(token).await {
            Ok(response) if response.active => Ok(oauth_context(token, &response)),
            Ok(_) => Err(AuthError::new(AuthErrorCode::InvalidToken, "token is not active")),
            Err(err) => Err(AuthError::new(
                AuthErrorCode::IntrospectionError,
                format!("token introspection failed: {err}"),
            )),
        }
    }

    /// Verifies a credential along the API-key path.
    async fn verify_api_key(&self, key: &str) -> AuthResult {
        let Some(validator) = &self.api_keys else {
            return Err(AuthError::new(
                AuthErrorCode::NoApiKeyConfig,
                "api-key verification is not configured",
            ));
        };
        match validator.verify_key(key).await {
            Ok(response) if response.valid => Ok(api_key_context(key, &response)),
            Ok(response) => Err(AuthError::new(
                AuthErrorCode::InvalidApiKey,
                response.error.unwrap_or_else(|| "api key rejected".to_string()),
            )),
            Err(err) => Err(AuthError::new(
                AuthErrorCode::VerificationError,
                format!("api key verification failed: {err}"),
            )),
        }
    }
}

#[async_trait]
impl TokenVerifier for VerifierDispatch {
    async fn verify(&self, credential: &str) -> AuthResult {
        match classify(credential) {
            TokenKind::Structured => self.verify_oauth(credential).await,
            TokenKind::SecretKey | TokenKind::ServiceKey => self.verify_api_key(credential).await,
            TokenKind::Unknown => {
                if self.oauth.is_some() {
                    // Unknown shapes are opaque bearer token candidates.
                    self.verify_oauth(credential).await
                } else {
                    Err(AuthError::new(
                        AuthErrorCode::InvalidAuthHeader,
                        "unrecognized credential format",
                    ))
                }
            }
        }
    }
}

// ============================================================================
// SECTION: Context Construction
// ============================================================================

/// Builds an OAuth context from an active introspection response.
fn oauth_context(token: &str, response: &IntrospectionResponse) -> AuthContext {
    let scopes: Vec<&str> = response.scope.as_deref().map_or_else(Vec::new, |s| {
        s.split(' ').collect()
    });
    let id = response
        .sub
        .clone()
        .or_else(|| response.client_id.clone())
        .unwrap_or_else(|| UNKNOWN_PRINCIPAL.to_string());
    // Read-only iff the scope set is exactly {read}; {read, x} is not
    // read-only. Admin is omitted, not false, when absent.
    let read_only = scopes == [READ_SCOPE];
    let is_admin = scopes.contains(&ADMIN_SCOPE).then_some(true);
    let mut metadata = BTreeMap::new();
    if let Some(scope) = &response.scope {
        metadata.insert("scope".to_string(), Value::String(scope.clone()));
    }
    if let Some(exp) = response.exp {
        metadata.insert("exp".to_string(), Value::from(exp));
    }
    if let Some(client_id) = &response.client_id {
        metadata.insert("client_id".to_string(), Value::String(client_id.clone()));
    }
    AuthContext {
        kind: AuthKind::Oauth,
        id,
        read_only,
        is_admin,
        raw_token: Some(token.to_string()),
        metadata: (!metadata.is_empty()).then_some(metadata),
    }
}

/// Builds an API-key context from a valid verification response.
fn api_key_context(key: &str, response: &KeyVerification) -> AuthContext {
    AuthContext {
        kind: AuthKind::ApiKey,
        id: response.key_id.clone().unwrap_or_else(|| UNKNOWN_PRINCIPAL.to_string()),
        read_only: response.read_only.unwrap_or(false),
        is_admin: response.is_admin,
        raw_token: Some(key.to_string()),
        metadata: response.metadata.clone(),
    }
}

#[cfg(test)]
mod tests;
