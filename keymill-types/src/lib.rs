//! Core type definitions for Keymill.
//!
//! This crate defines the fundamental types shared by the licensing engine:
//! - License and event identifiers (UUID v7)
//! - The fixed enumeration of licensable modules
//! - License, activation, and audit event records
//!
//! Anything that talks to callers (request schemas, HTTP shapes, admin
//! views) belongs in the embedding service, not here.

mod activation;
mod event;
mod ids;
mod license;
mod module;

pub use activation::Activation;
pub use event::{AuditEvent, EventId, EventKind};
pub use ids::LicenseId;
pub use license::{License, LicenseStatus};
pub use module::LicensedModule;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown module: {0}")]
    UnknownModule(String),
}
