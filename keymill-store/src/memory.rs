//! In-memory reference store.
//!
//! Keeps all three tables behind one mutex, which doubles as the
//! per-license serialization point the admission contract requires. Used by
//! the engine's tests and by embedders that don't need persistence.

use crate::error::{StoreError, StoreResult};
use crate::store::{ActivationStore, EventStore, LicenseStore, QuotaInsert};
use keymill_types::{Activation, AuditEvent, License, LicenseId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

#[derive(Debug, Default)]
struct Tables {
    licenses: HashMap<LicenseId, License>,
    activations: HashMap<(LicenseId, String), Activation>,
    events: Vec<AuditEvent>,
}

/// A thread-safe in-memory implementation of all three store traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("store mutex poisoned")
    }
}

impl LicenseStore for MemoryStore {
    fn insert_license(&self, license: &License) -> StoreResult<()> {
        let mut tables = self.lock();
        if tables.licenses.contains_key(&license.id) {
            return Err(StoreError::Duplicate(format!("license {}", license.id)));
        }
        tables.licenses.insert(license.id, license.clone());
        Ok(())
    }

    fn find_license(&self, id: LicenseId) -> StoreResult<Option<License>> {
        Ok(self.lock().licenses.get(&id).cloned())
    }

    fn find_by_token(&self, token: &str) -> StoreResult<Option<License>> {
        Ok(self
            .lock()
            .licenses
            .values()
            .find(|license| license.token == token)
            .cloned())
    }

    fn update_license(&self, license: &License) -> StoreResult<()> {
        let mut tables = self.lock();
        if !tables.licenses.contains_key(&license.id) {
            return Err(StoreError::NotFound(format!("license {}", license.id)));
        }
        tables.licenses.insert(license.id, license.clone());
        Ok(())
    }

    fn licenses_for_tenant(&self, tenant_id: &str) -> StoreResult<Vec<License>> {
        let mut licenses: Vec<License> = self
            .lock()
            .licenses
            .values()
            .filter(|license| license.tenant_id == tenant_id)
            .cloned()
            .collect();
        licenses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(licenses)
    }
}

impl ActivationStore for MemoryStore {
    fn find_activation(&self, license_id: LicenseId, hardware_id: &str) -> StoreResult<Option<Activation>> {
        Ok(self
            .lock()
            .activations
            .get(&(license_id, hardware_id.to_string()))
            .cloned())
    }

    fn count_activations(&self, license_id: LicenseId) -> StoreResult<u32> {
        let tables = self.lock();
        Ok(count_for(&tables, license_id))
    }

    fn activations_for_license(&self, license_id: LicenseId) -> StoreResult<Vec<Activation>> {
        let mut activations: Vec<Activation> = self
            .lock()
            .activations
            .values()
            .filter(|activation| activation.license_id == license_id)
            .cloned()
            .collect();
        activations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(activations)
    }

    fn insert_within_quota(&self, activation: Activation, max: u32) -> StoreResult<QuotaInsert> {
        // Count and insert under one guard: the serialization point.
        let mut tables = self.lock();

        let key = (activation.license_id, activation.hardware_id.clone());
        if tables.activations.contains_key(&key) {
            warn!(
                license_id = %activation.license_id,
                hardware_id = %activation.hardware_id,
                "duplicate activation insert rejected"
            );
            return Err(StoreError::Duplicate(format!(
                "activation ({}, {})",
                activation.license_id, activation.hardware_id
            )));
        }

        let current = count_for(&tables, activation.license_id);
        if current >= max {
            return Ok(QuotaInsert::Exhausted { current, max });
        }

        tables.activations.insert(key, activation);
        Ok(QuotaInsert::Admitted { ordinal: current + 1 })
    }
}

impl EventStore for MemoryStore {
    fn append_event(&self, event: &AuditEvent) -> StoreResult<()> {
        self.lock().events.push(event.clone());
        Ok(())
    }

    fn events_for_license(&self, license_id: LicenseId) -> StoreResult<Vec<AuditEvent>> {
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|event| event.license_id == license_id)
            .rev()
            .cloned()
            .collect())
    }
}

fn count_for(tables: &Tables, license_id: LicenseId) -> u32 {
    tables
        .activations
        .keys()
        .filter(|(id, _)| *id == license_id)
        .count() as u32
}
