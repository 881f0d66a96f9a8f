//! License lifecycle and activation engine for Keymill.
//!
//! This crate is the decision-making core of the licensing service:
//! - Issuance: sign a token, persist the authoritative license row
//! - Lifecycle: revoke, reactivate, extend, and the lazily derived EXPIRED
//!   state
//! - Validation: combine token verification with stored status into one
//!   effective-validity answer
//! - Admission: gate hardware activations against the per-license quota,
//!   idempotently for hardware that is already bound
//! - Audit: one immutable event per terminal decision
//!
//! # Design Principles
//!
//! - **The store is authoritative**: a token that verifies cryptographically
//!   but matches no license row is worthless
//! - **Policy outcomes are data**: revoked, expired, quota-exhausted, and
//!   malformed are returned as structured reasons, never as errors
//! - **Errors are infrastructure**: `Err` means the store or the issue-side
//!   schema failed, and it propagates
//! - **Quota atomicity lives in the store**: the engine relies on
//!   [`keymill_store::ActivationStore::insert_within_quota`] and the
//!   (license, hardware) uniqueness backstop, not on its own locking

mod admission;
mod engine;
mod error;
mod validation;

pub use admission::{ActivateRequest, ActivationDecision, ActivationReason};
pub use engine::{ExtendRequest, IssueRequest, LicenseEngine};
pub use error::{EngineError, EngineResult};
pub use validation::{Validation, ValidationReason, SYSTEM_ACTOR};
