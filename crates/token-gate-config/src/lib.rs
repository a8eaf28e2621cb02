// crates/token-gate-config/src/lib.rs
// ============================================================================
// Module: Token Gate Config
// Description: Configuration loading and validation for Token Gate.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: thiserror, token-gate-core, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits
//! and validated before use. Validation fails closed: cleartext verifier
//! URLs, embedded URL credentials, out-of-range cache or timeout settings,
//! and an authentication-required mode with no verifier configured are all
//! startup errors, never runtime surprises.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

#[cfg(test)]
mod tests {
    //! Test-only lint relaxations for panic-based assertions and debug output.
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
}

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::load;
pub use config::validate;
