// crates/token-gate-providers/src/oauth.rs
// ============================================================================
// Module: OAuth Introspection Provider
// Description: RFC 7662 token introspection over HTTP.
// Purpose: Ask the identity provider whether a structured token is active.
// Dependencies: async-trait, reqwest, token-gate-core
// ============================================================================

//! ## Overview
//! The introspection provider posts the credential as a form body to the
//! configured endpoint, authenticating with HTTP basic credentials when a
//! client identifier is configured. An `active: false` answer is a
//! definitive rejection handled by the router; everything that prevents
//! obtaining an answer is a [`VerifierError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use token_gate_core::IntrospectionResponse;
use token_gate_core::OauthConfig;
use token_gate_core::VerifierError;
use token_gate_core::verifier::OauthIntrospector;

// ============================================================================
// SECTION: Provider
// ============================================================================

/// HTTP-backed OAuth token introspection.
pub struct HttpOauthIntrospector {
    /// Introspection endpoint configuration.
    config: OauthConfig,
    /// HTTP client configured with the endpoint timeout.
    client: Client,
}

impl HttpOauthIntrospector {
    /// Builds an introspector from endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(config: OauthConfig) -> Result<Self, VerifierError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| VerifierError::Transport(err.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl OauthIntrospector for HttpOauthIntrospector {
    async fn introspect(&self, token: &str) -> Result<IntrospectionResponse, VerifierError> {
        let mut request = self
            .client
            .post(&self.config.introspection_url)
            .form(&[("token", token)]);
        if let Some(client_id) = &self.config.client_id {
            request = request.basic_auth(client_id, self.config.client_secret.as_deref());
        }
        let response = request
            .send()
            .await
            .map_err(|err| VerifierError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(VerifierError::Status(status.as_u16()));
        }
        response
            .json::<IntrospectionResponse>()
            .await
            .map_err(|err| VerifierError::Malformed(err.to_string()))
    }
}
