//! Repository traits the engine consumes.

use crate::StoreResult;
use keymill_types::{Activation, AuditEvent, License, LicenseId};

/// Outcome of an atomic quota-checked activation insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaInsert {
    /// The activation was inserted; `ordinal` is its position (prior count
    /// plus one).
    Admitted { ordinal: u32 },
    /// The license was already at its activation limit; nothing was
    /// inserted.
    Exhausted { current: u32, max: u32 },
}

/// Authoritative license rows.
pub trait LicenseStore: Send + Sync {
    /// Inserts a new license.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Duplicate`] if the id already exists.
    fn insert_license(&self, license: &License) -> StoreResult<()>;

    /// Looks up a license by id.
    fn find_license(&self, id: LicenseId) -> StoreResult<Option<License>>;

    /// Looks up a license by its CURRENT token string. Superseded tokens
    /// never match, which is what makes extension invalidate them.
    fn find_by_token(&self, token: &str) -> StoreResult<Option<License>>;

    /// Replaces an existing license row.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::NotFound`] if the id is absent.
    fn update_license(&self, license: &License) -> StoreResult<()>;

    /// Returns a tenant's licenses, newest first.
    fn licenses_for_tenant(&self, tenant_id: &str) -> StoreResult<Vec<License>>;
}

/// Hardware activation rows, keyed uniquely by (license, hardware).
pub trait ActivationStore: Send + Sync {
    /// Looks up the activation for a (license, hardware) pair.
    fn find_activation(
        &self,
        license_id: LicenseId,
        hardware_id: &str,
    ) -> StoreResult<Option<Activation>>;

    /// Counts activations for a license.
    fn count_activations(&self, license_id: LicenseId) -> StoreResult<u32>;

    /// Returns a license's activations, oldest first.
    fn activations_for_license(&self, license_id: LicenseId) -> StoreResult<Vec<Activation>>;

    /// Counts and inserts as one atomic step with respect to other calls
    /// for the same license: the `>= max` comparison and the insert happen
    /// under a single serialization point.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Duplicate`] if the (license, hardware)
    /// pair already exists — the backstop for concurrent duplicate
    /// admissions; callers are expected to check [`Self::find_activation`]
    /// first.
    fn insert_within_quota(&self, activation: Activation, max: u32) -> StoreResult<QuotaInsert>;
}

/// Append-only audit events.
pub trait EventStore: Send + Sync {
    /// Appends an event. Events are never mutated or deleted.
    fn append_event(&self, event: &AuditEvent) -> StoreResult<()>;

    /// Returns a license's events, most recent first.
    fn events_for_license(&self, license_id: LicenseId) -> StoreResult<Vec<AuditEvent>>;
}
