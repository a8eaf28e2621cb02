// crates/token-gate/src/gate.rs
// ============================================================================
// Module: Gateway Assembly
// Description: Construction of the full authentication pipeline.
// Purpose: Build a gateway from validated configuration in one call.
// Dependencies: thiserror, token-gate-core, token-gate-cache,
//               token-gate-config, token-gate-providers
// ============================================================================

//! ## Overview
//! Assembly validates the configuration first, then builds the HTTP
//! providers, wraps them in the verifier dispatch, fronts the dispatch with
//! the caching authenticator, and hands the result to the trust-mode router.
//! Construction is fallible only for configuration and client-setup reasons;
//! once built, the gateway itself never errors out of band.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use token_gate_cache::CachedAuthenticator;
use token_gate_config::ConfigError;
use token_gate_core::AuthConfig;
use token_gate_core::AuthGateway;
use token_gate_core::VerifierDispatch;
use token_gate_core::VerifierError;
use token_gate_core::audit::AuthAuditSink;
use token_gate_core::verifier::ApiKeyValidator;
use token_gate_core::verifier::OauthIntrospector;
use token_gate_core::verifier::TokenVerifier;
use token_gate_providers::HttpApiKeyValidator;
use token_gate_providers::HttpOauthIntrospector;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Gateway assembly failures.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Verifier client construction failed.
    #[error("verifier setup failed: {0}")]
    Verifier(#[from] VerifierError),
}

// ============================================================================
// SECTION: Assembly
// ============================================================================

/// Builds a gateway from configuration with a no-op audit sink.
///
/// # Errors
///
/// Returns [`GateError`] when validation or client construction fails.
pub fn build_gateway(config: &AuthConfig) -> Result<AuthGateway, GateError> {
    let verifier = build_verifier(config)?;
    Ok(AuthGateway::new(config.mode, verifier))
}

/// Builds a gateway recording decisions to the given audit sink.
///
/// # Errors
///
/// Returns [`GateError`] when validation or client construction fails.
pub fn build_gateway_with_audit(
    config: &AuthConfig,
    audit: Arc<dyn AuthAuditSink>,
) -> Result<AuthGateway, GateError> {
    let verifier = build_verifier(config)?;
    Ok(AuthGateway::with_audit(config.mode, verifier, audit))
}

/// Loads configuration from disk and builds a gateway from it.
///
/// # Errors
///
/// Returns [`GateError`] when loading, validation, or client construction
/// fails.
pub fn load_gateway(path: Option<&Path>) -> Result<AuthGateway, GateError> {
    let config = token_gate_config::load(path)?;
    build_gateway(&config)
}

/// Builds the cached verifier stack beneath the router.
fn build_verifier(config: &AuthConfig) -> Result<Arc<dyn TokenVerifier>, GateError> {
    token_gate_config::validate(config)?;
    let oauth: Option<Arc<dyn OauthIntrospector>> = match &config.oauth {
        Some(oauth_config) => Some(Arc::new(HttpOauthIntrospector::new(oauth_config.clone())?)),
        None => None,
    };
    let api_keys: Option<Arc<dyn ApiKeyValidator>> = match &config.api_key {
        Some(key_config) => Some(Arc::new(HttpApiKeyValidator::new(key_config.clone())?)),
        None => None,
    };
    let dispatch: Arc<dyn TokenVerifier> = Arc::new(VerifierDispatch::new(oauth, api_keys));
    Ok(Arc::new(CachedAuthenticator::new(dispatch, config.cache)))
}
