// crates/token-gate-config/src/config.rs
// ============================================================================
// Module: Configuration Loader
// Description: TOML loading, path resolution, and fail-closed validation.
// Purpose: Reject unusable or unsafe authentication configuration at startup.
// Dependencies: thiserror, token-gate-core, toml, url
// ============================================================================

//! ## Overview
//! The loader resolves a config path (explicit argument, then the
//! `TOKEN_GATE_CONFIG` environment variable, then the default filename),
//! enforces file-size and path-length limits, parses TOML into
//! [`AuthConfig`], and validates it. Verifier URLs must use `https://`
//! unless `allow_http` is set, must never embed credentials, and every
//! numeric setting must sit inside its hard bounds.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use token_gate_core::AuthConfig;
use token_gate_core::TrustMode;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "token-gate.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "TOKEN_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Minimum cache entry time-to-live in milliseconds.
pub(crate) const MIN_CACHE_TTL_MS: u64 = 1_000;
/// Maximum cache entry time-to-live in milliseconds (24 hours).
pub(crate) const MAX_CACHE_TTL_MS: u64 = 86_400_000;
/// Minimum cache capacity.
pub(crate) const MIN_CACHE_ENTRIES: usize = 1;
/// Maximum cache capacity.
pub(crate) const MAX_CACHE_ENTRIES: usize = 1_048_576;
/// Minimum upstream verifier timeout in milliseconds.
pub(crate) const MIN_VERIFIER_TIMEOUT_MS: u64 = 100;
/// Maximum upstream verifier timeout in milliseconds.
pub(crate) const MAX_VERIFIER_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates authentication configuration from disk.
///
/// # Errors
///
/// Returns [`ConfigError`] when resolution, reading, parsing, or validation
/// fails.
pub fn load(path: Option<&Path>) -> Result<AuthConfig, ConfigError> {
    let resolved = resolve_path(path)?;
    validate_path(&resolved)?;
    let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
    }
    let content = std::str::from_utf8(&bytes)
        .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
    let config: AuthConfig =
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
    validate(&config)?;
    Ok(config)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates authentication configuration for internal consistency.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when any fail-closed rule is violated.
pub fn validate(config: &AuthConfig) -> Result<(), ConfigError> {
    if config.mode == TrustMode::AuthenticationRequired
        && config.oauth.is_none()
        && config.api_key.is_none()
    {
        return Err(ConfigError::Invalid(
            "authentication-required mode needs at least one verifier configured".to_string(),
        ));
    }
    if let Some(oauth) = &config.oauth {
        validate_endpoint_url("oauth introspection_url", &oauth.introspection_url, config.allow_http)?;
        validate_timeout("oauth timeout_ms", oauth.timeout_ms)?;
        if oauth.client_secret.is_some() && oauth.client_id.is_none() {
            return Err(ConfigError::Invalid(
                "oauth client_secret requires client_id".to_string(),
            ));
        }
    }
    if let Some(api_key) = &config.api_key {
        validate_endpoint_url("api_key verify_url", &api_key.verify_url, config.allow_http)?;
        validate_timeout("api_key timeout_ms", api_key.timeout_ms)?;
    }
    if !(MIN_CACHE_TTL_MS..=MAX_CACHE_TTL_MS).contains(&config.cache.ttl_ms) {
        return Err(ConfigError::Invalid(format!(
            "cache ttl_ms must be within [{MIN_CACHE_TTL_MS}, {MAX_CACHE_TTL_MS}]"
        )));
    }
    if !(MIN_CACHE_ENTRIES..=MAX_CACHE_ENTRIES).contains(&config.cache.max_entries) {
        return Err(ConfigError::Invalid(format!(
            "cache max_entries must be within [{MIN_CACHE_ENTRIES}, {MAX_CACHE_ENTRIES}]"
        )));
    }
    Ok(())
}

/// Validates an upstream verifier endpoint URL.
fn validate_endpoint_url(label: &str, value: &str, allow_http: bool) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|_| ConfigError::Invalid(format!("{label} is not a valid url")))?;
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => {
            return Err(ConfigError::Invalid(format!(
                "{label} must use https (set allow_http for loopback testing)"
            )));
        }
        scheme => {
            return Err(ConfigError::Invalid(format!("{label} has unsupported scheme {scheme}")));
        }
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid(format!("{label} is missing a host")));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::Invalid(format!("{label} must not embed credentials")));
    }
    Ok(())
}

/// Validates an upstream verifier timeout.
fn validate_timeout(label: &str, timeout_ms: u64) -> Result<(), ConfigError> {
    if !(MIN_VERIFIER_TIMEOUT_MS..=MAX_VERIFIER_TIMEOUT_MS).contains(&timeout_ms) {
        return Err(ConfigError::Invalid(format!(
            "{label} must be within [{MIN_VERIFIER_TIMEOUT_MS}, {MAX_VERIFIER_TIMEOUT_MS}]"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}
