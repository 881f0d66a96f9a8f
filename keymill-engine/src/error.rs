//! Error types for the engine.
//!
//! Only infrastructure and schema failures live here. Policy outcomes
//! (revoked, expired, quota exhausted, bad token) are data, carried by
//! [`crate::Validation`] and [`crate::ActivationDecision`].

use keymill_types::LicenseId;
use thiserror::Error;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A request failed schema-level validation; nothing was written.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An administrative operation addressed a license that does not exist.
    #[error("license not found: {0}")]
    LicenseNotFound(LicenseId),

    /// The requested status transition is not expressible.
    #[error("invalid status change: {0}")]
    InvalidStatusChange(String),

    /// Token issuing failed.
    #[error(transparent)]
    Token(#[from] keymill_token::TokenError),

    /// The record store failed. Embedders surface this as a generic
    /// internal error; it is never swallowed here.
    #[error(transparent)]
    Store(#[from] keymill_store::StoreError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
