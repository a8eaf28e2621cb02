// crates/token-gate/tests/gateway_flow.rs
// ============================================================================
// Module: Gateway Flow Tests
// Description: End-to-end tests of the assembled authentication pipeline.
// Purpose: Validate routing, verification, caching, and auditing together.
// Dependencies: token-gate, token-gate-core, tiny_http, tokio, tempfile
// ============================================================================

//! ## Overview
//! These tests build gateways from real configuration and drive them against
//! loopback verifier servers: trust-mode routing, OAuth introspection and
//! API-key outcomes, credential caching across requests, and audit trails.
//! Servers are provisioned for an exact request count so an unexpected
//! upstream call fails the test.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::thread;

use tiny_http::Response;
use tiny_http::Server;

use token_gate::AuthErrorCode;
use token_gate::AuthKind;
use token_gate::TrustMode;
use token_gate::build_gateway;
use token_gate::build_gateway_with_audit;
use token_gate_core::ApiKeyConfig;
use token_gate_core::AuthConfig;
use token_gate_core::FileAuditSink;
use token_gate_core::OauthConfig;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Spawns a loopback server answering `count` requests with the given body.
fn spawn_server(body: &'static str, count: usize) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}");

    let handle = thread::spawn(move || {
        for _ in 0..count {
            if let Ok(request) = server.recv() {
                let response = Response::from_string(body).with_status_code(200);
                let _ = request.respond(response);
            }
        }
    });

    (url, handle)
}

/// Configuration routing structured tokens to the given introspection URL.
fn oauth_only_config(mode: TrustMode, url: String) -> AuthConfig {
    AuthConfig {
        mode,
        oauth: Some(OauthConfig {
            introspection_url: url,
            client_id: None,
            client_secret: None,
            timeout_ms: 5_000,
        }),
        api_key: None,
        cache: token_gate_core::CacheConfig::default(),
        allow_http: true,
    }
}

/// Configuration routing API keys to the given verification URL.
fn api_key_only_config(mode: TrustMode, url: String) -> AuthConfig {
    AuthConfig {
        mode,
        oauth: None,
        api_key: Some(ApiKeyConfig {
            verify_url: url,
            timeout_ms: 5_000,
        }),
        cache: token_gate_core::CacheConfig::default(),
        allow_http: true,
    }
}

// ============================================================================
// SECTION: Trust-Mode Routing
// ============================================================================

/// Anonymous-or-authenticated grants the anonymous context without a header.
#[tokio::test]
async fn missing_header_falls_back_to_anonymous() {
    let config = AuthConfig {
        mode: TrustMode::AnonymousOrAuthenticated,
        ..AuthConfig::default()
    };
    let gateway = build_gateway(&config).unwrap();
    let context = gateway.authenticate(None).await.unwrap();
    assert_eq!(context.kind, AuthKind::Anonymous);
    assert_eq!(context.id, "anonymous");
}

/// Authentication-required rejects missing headers with UNAUTHORIZED.
#[tokio::test]
async fn required_mode_rejects_missing_header() {
    let (url, handle) = spawn_server(r#"{"active":true}"#, 0);
    let gateway = build_gateway(&oauth_only_config(TrustMode::AuthenticationRequired, url)).unwrap();
    let error = gateway.authenticate(None).await.unwrap_err();
    assert_eq!(error.code, AuthErrorCode::Unauthorized);
    handle.join().unwrap();
}

/// Non-bearer schemes are rejected without touching the verifier.
#[tokio::test]
async fn basic_scheme_is_unsupported() {
    let (url, handle) = spawn_server(r#"{"valid":true}"#, 0);
    let gateway =
        build_gateway(&api_key_only_config(TrustMode::AuthenticationRequired, url)).unwrap();
    let error = gateway.authenticate(Some("Basic abc123")).await.unwrap_err();
    assert_eq!(error.code, AuthErrorCode::UnsupportedAuthScheme);
    handle.join().unwrap();
}

/// Unknown credential shapes without OAuth configured are rejected locally.
#[tokio::test]
async fn unknown_shape_without_oauth_is_rejected() {
    let (url, handle) = spawn_server(r#"{"valid":true}"#, 0);
    let gateway =
        build_gateway(&api_key_only_config(TrustMode::AuthenticationRequired, url)).unwrap();
    let error = gateway.authenticate(Some("Bearer opaque-token")).await.unwrap_err();
    assert_eq!(error.code, AuthErrorCode::InvalidAuthHeader);
    handle.join().unwrap();
}

// ============================================================================
// SECTION: OAuth Outcomes
// ============================================================================

/// An active token with exactly the read scope yields a read-only context.
#[tokio::test]
async fn read_scope_token_yields_read_only_context() {
    let (url, handle) =
        spawn_server(r#"{"active":true,"sub":"user-1","scope":"read"}"#, 1);
    let gateway =
        build_gateway(&oauth_only_config(TrustMode::AuthenticationRequired, url)).unwrap();

    let context = gateway.authenticate(Some("Bearer aaa.bbb.ccc")).await.unwrap();
    assert_eq!(context.kind, AuthKind::Oauth);
    assert_eq!(context.id, "user-1");
    assert!(context.read_only);
    assert_eq!(context.is_admin, None);
    handle.join().unwrap();
}

/// Admin scope without identifying claims yields an unknown admin principal.
#[tokio::test]
async fn admin_scope_without_subject_is_unknown_principal() {
    let (url, handle) =
        spawn_server(r#"{"active":true,"scope":"read write admin"}"#, 1);
    let gateway =
        build_gateway(&oauth_only_config(TrustMode::AuthenticationRequired, url)).unwrap();

    let context = gateway.authenticate(Some("Bearer aaa.bbb.ccc")).await.unwrap();
    assert_eq!(context.id, "unknown");
    assert!(!context.read_only);
    assert_eq!(context.is_admin, Some(true));
    handle.join().unwrap();
}

/// An inactive token is a definitive rejection.
#[tokio::test]
async fn inactive_token_is_invalid() {
    let (url, handle) = spawn_server(r#"{"active":false}"#, 1);
    let gateway =
        build_gateway(&oauth_only_config(TrustMode::AuthenticationRequired, url)).unwrap();

    let error = gateway.authenticate(Some("Bearer aaa.bbb.ccc")).await.unwrap_err();
    assert_eq!(error.code, AuthErrorCode::InvalidToken);
    handle.join().unwrap();
}

// ============================================================================
// SECTION: API-Key Outcomes
// ============================================================================

/// A valid secret key yields an API-key context with its identity fields.
#[tokio::test]
async fn valid_secret_key_yields_api_key_context() {
    let (url, handle) =
        spawn_server(r#"{"valid":true,"key_id":"key-7","read_only":true}"#, 1);
    let gateway =
        build_gateway(&api_key_only_config(TrustMode::AuthenticationRequired, url)).unwrap();

    let context = gateway.authenticate(Some("Bearer sk-live-42")).await.unwrap();
    assert_eq!(context.kind, AuthKind::ApiKey);
    assert_eq!(context.id, "key-7");
    assert!(context.read_only);
    handle.join().unwrap();
}

/// A rejected key carries the upstream reason under INVALID_API_KEY.
#[tokio::test]
async fn rejected_key_carries_upstream_reason() {
    let (url, handle) = spawn_server(r#"{"valid":false,"error":"key revoked"}"#, 1);
    let gateway =
        build_gateway(&api_key_only_config(TrustMode::AuthenticationRequired, url)).unwrap();

    let error = gateway.authenticate(Some("Bearer svc-worker-1")).await.unwrap_err();
    assert_eq!(error.code, AuthErrorCode::InvalidApiKey);
    assert_eq!(error.message, "key revoked");
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Caching
// ============================================================================

/// A verified token is served from cache; the upstream sees one request.
#[tokio::test]
async fn verified_token_is_cached_across_requests() {
    // The server accepts exactly one request; a second upstream call would
    // hang and fail the second authenticate with a transport error.
    let (url, handle) =
        spawn_server(r#"{"active":true,"sub":"user-1","scope":"read"}"#, 1);
    let gateway =
        build_gateway(&oauth_only_config(TrustMode::AuthenticationRequired, url)).unwrap();

    let first = gateway.authenticate(Some("Bearer aaa.bbb.ccc")).await.unwrap();
    let second = gateway.authenticate(Some("Bearer aaa.bbb.ccc")).await.unwrap();
    assert_eq!(first.id, second.id);
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Auditing
// ============================================================================

/// Every decision lands in the audit file as one JSON line.
#[tokio::test]
async fn decisions_are_audited_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.log");
    let sink = Arc::new(FileAuditSink::new(&path).unwrap());

    let (url, handle) = spawn_server(r#"{"active":false}"#, 1);
    let gateway = build_gateway_with_audit(
        &oauth_only_config(TrustMode::AnonymousOrAuthenticated, url),
        sink,
    )
    .unwrap();

    gateway.authenticate(None).await.unwrap();
    gateway.authenticate(Some("Bearer aaa.bbb.ccc")).await.unwrap_err();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["decision"], "allow");
    assert_eq!(lines[1]["decision"], "deny");
    assert_eq!(lines[1]["error_code"], "INVALID_TOKEN");
    // Raw credentials never appear in the audit trail.
    assert!(!contents.contains("aaa.bbb.ccc"));
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Assembly Failures
// ============================================================================

/// Invalid configuration fails assembly, not the first request.
#[tokio::test]
async fn invalid_config_fails_at_build_time() {
    let config = AuthConfig {
        mode: TrustMode::AuthenticationRequired,
        ..AuthConfig::default()
    };
    let error = build_gateway(&config).unwrap_err();
    assert!(error.to_string().contains("at least one verifier"));
}
