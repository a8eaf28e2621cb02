// crates/token-gate-core/src/gateway/tests.rs
// ============================================================================
// Module: Gateway Unit Tests
// Description: Policy table and dispatch tests with stub verifiers.
// ============================================================================

//! Unit tests for the trust-mode router and verifier dispatch.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions use unwrap for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::verifier::VerifierError;

/// Introspector stub returning a canned response and counting calls.
struct StubIntrospector {
    /// Canned response returned to every call.
    response: Result<IntrospectionResponse, VerifierError>,
    /// Number of introspection calls observed.
    calls: Mutex<usize>,
}

impl StubIntrospector {
    /// Creates a stub returning the given response.
    fn new(response: Result<IntrospectionResponse, VerifierError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(0),
        })
    }

    /// Returns the observed call count.
    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl OauthIntrospector for StubIntrospector {
    async fn introspect(&self, _token: &str) -> Result<IntrospectionResponse, VerifierError> {
        *self.calls.lock().unwrap() += 1;
        self.response.clone()
    }
}

/// Validator stub returning a canned response.
struct StubValidator {
    /// Canned response returned to every call.
    response: Result<KeyVerification, VerifierError>,
}

#[async_trait]
impl ApiKeyValidator for StubValidator {
    async fn verify_key(&self, _key: &str) -> Result<KeyVerification, VerifierError> {
        self.response.clone()
    }
}

/// Convenience constructor for an active introspection response.
fn active(sub: Option<&str>, client_id: Option<&str>, scope: Option<&str>) -> IntrospectionResponse {
    IntrospectionResponse {
        active: true,
        sub: sub.map(str::to_string),
        client_id: client_id.map(str::to_string),
        scope: scope.map(str::to_string),
        exp: None,
    }
}

/// Builds a gateway over a dispatch with optional strategies.
fn gateway(
    mode: TrustMode,
    oauth: Option<Arc<dyn OauthIntrospector>>,
    api_keys: Option<Arc<dyn ApiKeyValidator>>,
) -> AuthGateway {
    AuthGateway::new(mode, Arc::new(VerifierDispatch::new(oauth, api_keys)))
}

// ============================================================================
// SECTION: Mode Router Tests
// ============================================================================

#[tokio::test]
async fn anonymous_only_ignores_any_header() {
    let introspector = StubIntrospector::new(Ok(active(Some("user-1"), None, Some("read"))));
    let gw = gateway(TrustMode::AnonymousOnly, Some(introspector.clone()), None);

    for header in [None, Some("garbage"), Some("Bearer a.b.c"), Some("Basic abc")] {
        let result = gw.authenticate(header).await.expect("anonymous grant");
        assert_eq!(result, AuthContext::anonymous());
    }
    // The header is never inspected, so no verifier call happens.
    assert_eq!(introspector.calls(), 0);
}

#[tokio::test]
async fn malformed_header_rejected_before_mode() {
    for mode in [TrustMode::AnonymousOrAuthenticated, TrustMode::AuthenticationRequired] {
        let gw = gateway(mode, None, None);
        let error = gw.authenticate(Some("Bearer a b")).await.expect_err("malformed");
        assert_eq!(error.code, AuthErrorCode::InvalidAuthHeader);
    }
}

#[tokio::test]
async fn missing_header_grants_anonymous_when_permitted() {
    let gw = gateway(TrustMode::AnonymousOrAuthenticated, None, None);
    let context = gw.authenticate(None).await.expect("anonymous grant");
    assert_eq!(context.kind, AuthKind::Anonymous);
    assert_eq!(context.id, "anonymous");
    assert!(context.read_only);
}

#[tokio::test]
async fn missing_header_rejected_when_authentication_required() {
    let gw = gateway(TrustMode::AuthenticationRequired, None, None);
    let error = gw.authenticate(None).await.expect_err("unauthorized");
    assert_eq!(error.code, AuthErrorCode::Unauthorized);
}

#[tokio::test]
async fn non_bearer_scheme_rejected() {
    let introspector = StubIntrospector::new(Ok(active(Some("user-1"), None, None)));
    let gw =
        gateway(TrustMode::AnonymousOrAuthenticated, Some(introspector.clone()), None);
    let error = gw.authenticate(Some("Basic abc123")).await.expect_err("scheme");
    assert_eq!(error.code, AuthErrorCode::UnsupportedAuthScheme);
    assert_eq!(introspector.calls(), 0);
}

#[tokio::test]
async fn bearer_scheme_matches_case_insensitively() {
    let introspector = StubIntrospector::new(Ok(active(Some("user-1"), None, None)));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let context = gw.authenticate(Some("BEARER a.b.c")).await.expect("grant");
    assert_eq!(context.kind, AuthKind::Oauth);
}

// ============================================================================
// SECTION: Dispatch Tests
// ============================================================================

#[tokio::test]
async fn structured_token_routes_to_oauth() {
    let introspector = StubIntrospector::new(Ok(active(Some("user-1"), None, Some("read"))));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector.clone()), None);
    let context = gw.authenticate(Some("Bearer h.p.s")).await.expect("grant");
    assert_eq!(context.kind, AuthKind::Oauth);
    assert_eq!(introspector.calls(), 1);
}

#[tokio::test]
async fn api_key_families_route_to_key_path() {
    let validator = Arc::new(StubValidator {
        response: Ok(KeyVerification {
            valid: true,
            error: None,
            key_id: Some("key-7".to_string()),
            read_only: Some(true),
            is_admin: None,
            metadata: None,
        }),
    });
    let gw = gateway(TrustMode::AuthenticationRequired, None, Some(validator));
    for credential in ["Bearer sk-abc", "Bearer svc-abc"] {
        let context = gw.authenticate(Some(credential)).await.expect("grant");
        assert_eq!(context.kind, AuthKind::ApiKey);
        assert_eq!(context.id, "key-7");
        assert!(context.read_only);
        assert!(context.is_admin.is_none());
    }
}

#[tokio::test]
async fn unknown_token_introspected_when_oauth_configured() {
    let introspector = StubIntrospector::new(Ok(active(Some("user-1"), None, None)));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector.clone()), None);
    let context = gw.authenticate(Some("Bearer opaque-token")).await.expect("grant");
    assert_eq!(context.kind, AuthKind::Oauth);
    assert_eq!(introspector.calls(), 1);
}

#[tokio::test]
async fn unknown_token_rejected_without_oauth_config() {
    let gw = gateway(TrustMode::AuthenticationRequired, None, None);
    let error = gw.authenticate(Some("Bearer opaque-token")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::InvalidAuthHeader);
}

#[tokio::test]
async fn structured_token_without_oauth_config_is_config_error() {
    let gw = gateway(TrustMode::AuthenticationRequired, None, None);
    let error = gw.authenticate(Some("Bearer a.b.c")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::NoOauthConfig);
}

#[tokio::test]
async fn api_key_without_config_is_config_error() {
    let gw = gateway(TrustMode::AuthenticationRequired, None, None);
    let error = gw.authenticate(Some("Bearer sk-abc")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::NoApiKeyConfig);
}

#[tokio::test]
async fn inactive_token_rejected_as_invalid() {
    let introspector = StubIntrospector::new(Ok(IntrospectionResponse {
        active: false,
        sub: None,
        client_id: None,
        scope: None,
        exp: None,
    }));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let error = gw.authenticate(Some("Bearer a.b.c")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::InvalidToken);
}

#[tokio::test]
async fn introspection_transport_failure_is_wrapped() {
    let introspector =
        StubIntrospector::new(Err(VerifierError::Transport("connection refused".to_string())));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let error = gw.authenticate(Some("Bearer a.b.c")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::IntrospectionError);
    assert!(error.message.contains("connection refused"));
}

#[tokio::test]
async fn key_transport_failure_is_wrapped() {
    let validator = Arc::new(StubValidator {
        response: Err(VerifierError::Status(503)),
    });
    let gw = gateway(TrustMode::AuthenticationRequired, None, Some(validator));
    let error = gw.authenticate(Some("Bearer sk-abc")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::VerificationError);
}

#[tokio::test]
async fn invalid_key_uses_verifier_reason() {
    let validator = Arc::new(StubValidator {
        response: Ok(KeyVerification {
            valid: false,
            error: Some("key revoked".to_string()),
            key_id: None,
            read_only: None,
            is_admin: None,
            metadata: None,
        }),
    });
    let gw = gateway(TrustMode::AuthenticationRequired, None, Some(validator));
    let error = gw.authenticate(Some("Bearer sk-abc")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::InvalidApiKey);
    assert_eq!(error.message, "key revoked");
}

#[tokio::test]
async fn invalid_key_without_reason_uses_generic_message() {
    let validator = Arc::new(StubValidator {
        response: Ok(KeyVerification {
            valid: false,
            error: None,
            key_id: None,
            read_only: None,
            is_admin: None,
            metadata: None,
        }),
    });
    let gw = gateway(TrustMode::AuthenticationRequired, None, Some(validator));
    let error = gw.authenticate(Some("Bearer sk-abc")).await.expect_err("reject");
    assert_eq!(error.code, AuthErrorCode::InvalidApiKey);
    assert_eq!(error.message, "api key rejected");
}

// ============================================================================
// SECTION: Context Construction Tests
// ============================================================================

#[tokio::test]
async fn read_scope_alone_is_read_only() {
    let introspector = StubIntrospector::new(Ok(active(Some("user-1"), None, Some("read"))));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let context = gw.authenticate(Some("Bearer a.b.c")).await.expect("grant");
    assert_eq!(context.id, "user-1");
    assert!(context.read_only);
    assert!(context.is_admin.is_none());
}

#[tokio::test]
async fn broader_scopes_are_not_read_only() {
    let introspector =
        StubIntrospector::new(Ok(active(None, None, Some("read write admin"))));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let context = gw.authenticate(Some("Bearer a.b.c")).await.expect("grant");
    assert_eq!(context.id, "unknown");
    assert!(!context.read_only);
    assert_eq!(context.is_admin, Some(true));
}

#[tokio::test]
async fn read_plus_other_scope_is_not_read_only() {
    let introspector = StubIntrospector::new(Ok(active(Some("user-1"), None, Some("read foo"))));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let context = gw.authenticate(Some("Bearer a.b.c")).await.expect("grant");
    assert!(!context.read_only);
}

#[tokio::test]
async fn id_falls_back_to_client_id() {
    let introspector = StubIntrospector::new(Ok(active(None, Some("client-9"), None)));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let context = gw.authenticate(Some("Bearer a.b.c")).await.expect("grant");
    assert_eq!(context.id, "client-9");
}

#[tokio::test]
async fn metadata_carries_claims_verbatim() {
    let introspector = StubIntrospector::new(Ok(IntrospectionResponse {
        active: true,
        sub: Some("user-1".to_string()),
        client_id: Some("client-9".to_string()),
        scope: Some("read write".to_string()),
        exp: Some(1_900_000_000),
    }));
    let gw = gateway(TrustMode::AuthenticationRequired, Some(introspector), None);
    let context = gw.authenticate(Some("Bearer a.b.c")).await.expect("grant");
    let metadata = context.metadata.expect("metadata");
    assert_eq!(metadata.get("scope"), Some(&serde_json::json!("read write")));
    assert_eq!(metadata.get("exp"), Some(&serde_json::json!(1_900_000_000)));
    assert_eq!(metadata.get("client_id"), Some(&serde_json::json!("client-9")));
    assert_eq!(context.raw_token.as_deref(), Some("a.b.c"));
}
