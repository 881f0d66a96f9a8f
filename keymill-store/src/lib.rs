//! The record-store boundary for Keymill.
//!
//! Authoritative license state lives behind three repository traits:
//! licenses, activations, and audit events. The engine consumes the traits;
//! what actually persists the rows (SQL, a managed service, memory) is the
//! embedder's choice.
//!
//! # Concurrency contract
//!
//! Admission is a count-then-insert sequence, so the store — not the engine
//! — is the serialization point. Every implementation must provide both:
//! - [`ActivationStore::insert_within_quota`] atomic per license, so two
//!   concurrent admissions at the last free slot cannot both succeed
//! - uniqueness of the (license, hardware) pair, so duplicate concurrent
//!   admissions for the same new hardware collide safely
//!
//! [`MemoryStore`] satisfies both behind a single mutex and is what the
//! engine's tests run against.

mod error;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{ActivationStore, EventStore, LicenseStore, QuotaInsert};
