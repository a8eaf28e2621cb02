// crates/token-gate-core/src/audit.rs
// ============================================================================
// Module: Authentication Audit Logging
// Description: Structured audit events for authentication decisions.
// Purpose: Emit redacted decision logs without hard dependencies.
// Dependencies: serde, serde_json, sha2
// ============================================================================

//! ## Overview
//! Every authentication decision produces one audit event. Raw credentials
//! never appear in events; bearer material is reduced to a SHA-256
//! fingerprint. Sinks are intentionally lightweight so deployments can route
//! events to their preferred logging pipeline without redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::config::TrustMode;
use crate::context::AuthContext;
use crate::error::AuthError;

// ============================================================================
// SECTION: Event Payload
// ============================================================================

/// Authentication decision audit event.
///
/// # Invariants
/// - `token_fingerprint` is a SHA-256 hex digest; the raw credential is
///   never recorded.
#[derive(Debug, Clone, Serialize)]
pub struct AuthAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Configured trust mode at decision time.
    pub mode: TrustMode,
    /// Decision outcome.
    pub decision: &'static str,
    /// Authentication kind label on allow.
    pub kind: Option<&'static str>,
    /// Principal identifier on allow.
    pub principal: Option<String>,
    /// Stable error code label on deny.
    pub error_code: Option<&'static str>,
    /// Failure reason on deny.
    pub reason: Option<String>,
    /// Credential fingerprint (sha256) when a credential was presented.
    pub token_fingerprint: Option<String>,
}

impl AuthAuditEvent {
    /// Builds an allow event.
    #[must_use]
    pub fn allowed(mode: TrustMode, context: &AuthContext, credential: Option<&str>) -> Self {
        Self {
            event: "auth_decision",
            timestamp_ms: now_ms(),
            mode,
            decision: "allow",
            kind: Some(context.kind.as_str()),
            principal: Some(context.id.clone()),
            error_code: None,
            reason: None,
            token_fingerprint: credential.map(fingerprint),
        }
    }

    /// Builds a deny event.
    #[must_use]
    pub fn denied(mode: TrustMode, error: &AuthError, credential: Option<&str>) -> Self {
        Self {
            event: "auth_decision",
            timestamp_ms: now_ms(),
            mode,
            decision: "deny",
            kind: None,
            principal: None,
            error_code: Some(error.code.as_str()),
            reason: Some(error.message.clone()),
            token_fingerprint: credential.map(fingerprint),
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for authentication decisions.
pub trait AuthAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &AuthAuditEvent);
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuthAuditSink for StderrAuditSink {
    fn record(&self, event: &AuthAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to an append-only file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuthAuditSink for FileAuditSink {
    fn record(&self, event: &AuthAuditEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopAuditSink;

impl AuthAuditSink for NoopAuditSink {
    fn record(&self, _event: &AuthAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current wall-clock time in milliseconds since epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

/// Reduces a credential to a lowercase SHA-256 hex fingerprint.
fn fingerprint(credential: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(credential.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================
