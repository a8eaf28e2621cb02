// crates/token-gate-providers/src/api_key.rs
// ============================================================================
// Module: API-Key Verification Provider
// Description: JSON API-key verification over HTTP.
// Purpose: Ask the key service whether an opaque API key is valid.
// Dependencies: async-trait, reqwest, serde_json, token-gate-core
// ============================================================================

//! ## Overview
//! The key provider posts `{"key": "<credential>"}` to the configured
//! verification endpoint and decodes the answer into
//! [`KeyVerification`]. A `valid: false` answer is a definitive rejection
//! handled by the router; everything that prevents obtaining an answer is a
//! [`VerifierError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use token_gate_core::ApiKeyConfig;
use token_gate_core::KeyVerification;
use token_gate_core::VerifierError;
use token_gate_core::verifier::ApiKeyValidator;

// ============================================================================
// SECTION: Provider
// ============================================================================

/// HTTP-backed API-key verification.
pub struct HttpApiKeyValidator {
    /// Verification endpoint configuration.
    config: ApiKeyConfig,
    /// HTTP client configured with the endpoint timeout.
    client: Client,
}

impl HttpApiKeyValidator {
    /// Builds a validator from endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(config: ApiKeyConfig) -> Result<Self, VerifierError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| VerifierError::Transport(err.to_string()))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ApiKeyValidator for HttpApiKeyValidator {
    async fn verify_key(&self, key: &str) -> Result<KeyVerification, VerifierError> {
        let response = self
            .client
            .post(&self.config.verify_url)
            .json(&json!({ "key": key }))
            .send()
            .await
            .map_err(|err| VerifierError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(VerifierError::Status(status.as_u16()));
        }
        response
            .json::<KeyVerification>()
            .await
            .map_err(|err| VerifierError::Malformed(err.to_string()))
    }
}
