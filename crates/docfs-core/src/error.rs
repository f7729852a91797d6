//! # Validation Errors
//!
//! Errors raised when a key or digest fails its format rules at construction
//! time. Each variant carries the rejected input so operators can see what the
//! client actually sent.

use thiserror::Error;

/// Validation errors for catalog key newtypes and digests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A namespace name or project id is empty after trimming.
    #[error("{field} must not be empty")]
    EmptyKey {
        /// Which key was empty (`"namespace name"`, `"project id"`).
        field: &'static str,
    },

    /// A namespace name or project id exceeds the maximum key length.
    #[error("{field} must not exceed {max} characters, got {actual}")]
    KeyTooLong {
        /// Which key was too long.
        field: &'static str,
        /// Maximum permitted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// A key contains a path separator and could not be addressed by URL.
    #[error("{field} must not contain '/': \"{value}\"")]
    KeyContainsSlash {
        /// Which key was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A digest string is not 32 lowercase-or-uppercase hex characters.
    #[error("invalid MD5 digest: \"{0}\" (expected 32 hex characters)")]
    InvalidDigest(String),
}
