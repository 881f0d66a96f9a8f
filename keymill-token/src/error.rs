//! Error types for token issuing.
//!
//! Verification deliberately has no error type: every outcome of checking a
//! token, including hostile garbage, is a [`crate::VerifyOutcome`] variant.

use thiserror::Error;

/// Errors that can occur when configuring a key or issuing a token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing key material is empty.
    #[error("signing key must not be empty")]
    EmptyKey,

    /// Signing key text is not valid base64.
    #[error("invalid signing key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// Issue request carried an empty tenant identifier.
    #[error("tenant identifier must not be empty")]
    EmptyTenant,

    /// Issue request carried no modules.
    #[error("token must grant at least one module")]
    NoModules,

    /// Payload serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;
