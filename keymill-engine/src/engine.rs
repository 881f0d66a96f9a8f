//! The engine itself: issuance and administrative lifecycle operations.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, SubsecRound, Utc};
use keymill_store::{ActivationStore, EventStore, LicenseStore};
use keymill_token::TokenCodec;
use keymill_types::{
    Activation, AuditEvent, EventKind, License, LicenseId, LicenseStatus, LicensedModule,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Request to issue a new license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRequest {
    /// Tenant the license belongs to.
    pub tenant_id: String,
    /// Modules to grant. Must be non-empty.
    pub modules: Vec<LicensedModule>,
    /// When the license expires.
    pub expires_at: DateTime<Utc>,
    /// Hardware activation quota. Must be at least 1.
    pub max_activations: u32,
    /// Identity of the issuing administrator.
    pub created_by: String,
}

/// Request to extend a license with a new expiry and a fresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendRequest {
    /// The license to extend.
    pub license_id: LicenseId,
    /// The new expiry instant.
    pub new_expiry: DateTime<Utc>,
    /// Whether a REVOKED license returns to ACTIVE. Defaults to true, which
    /// silently undoes a revocation — callers must opt out explicitly to
    /// keep a revoked license revoked while still refreshing its token.
    #[serde(default = "default_reactivate")]
    pub reactivate: bool,
    /// Identity of the extending administrator.
    pub actor: String,
}

fn default_reactivate() -> bool {
    true
}

/// The license lifecycle and activation engine.
///
/// Holds the token codec and the three store handles. Cheap to share:
/// operations take `&self` and the engine is `Send + Sync`, one instance
/// serving all request workers.
pub struct LicenseEngine {
    pub(crate) codec: TokenCodec,
    pub(crate) licenses: Arc<dyn LicenseStore>,
    pub(crate) activations: Arc<dyn ActivationStore>,
    pub(crate) events: Arc<dyn EventStore>,
}

impl LicenseEngine {
    /// Creates an engine around a codec and the three record stores.
    #[must_use]
    pub fn new(
        codec: TokenCodec,
        licenses: Arc<dyn LicenseStore>,
        activations: Arc<dyn ActivationStore>,
        events: Arc<dyn EventStore>,
    ) -> Self {
        Self {
            codec,
            licenses,
            activations,
            events,
        }
    }

    /// Issues a new license: signs a token, persists the row, records the
    /// creation event. The new license starts ACTIVE.
    ///
    /// # Errors
    ///
    /// Fails on schema violations (empty tenant, no modules, zero quota)
    /// before anything is written, or if the store does.
    pub fn issue(&self, request: &IssueRequest) -> EngineResult<License> {
        if request.max_activations == 0 {
            return Err(EngineError::InvalidRequest(
                "max_activations must be at least 1".to_string(),
            ));
        }

        let expires_at = request.expires_at.trunc_subsecs(0);
        let token = self
            .codec
            .issue(&request.tenant_id, &request.modules, expires_at)?;

        let license = License::new(
            request.tenant_id.trim(),
            request.modules.clone(),
            expires_at,
            request.max_activations,
            token,
            request.created_by.clone(),
        );
        self.licenses.insert_license(&license)?;

        self.record_event(
            license.id,
            EventKind::Created,
            format!(
                "license issued for tenant {} with modules [{}]",
                license.tenant_id,
                module_names(&license.modules)
            ),
            &license.created_by,
        )?;

        info!(
            license_id = %license.id,
            tenant = %license.tenant_id,
            max_activations = license.max_activations,
            "license issued"
        );
        Ok(license)
    }

    /// Changes a license's stored status by administrative action.
    ///
    /// ACTIVE → REVOKED and REVOKED → ACTIVE are always permitted, in
    /// either direction; revocation is reversible. EXPIRED is derived from
    /// token expiry and cannot be set directly.
    ///
    /// Revoking does NOT release consumed activation slots.
    pub fn change_status(
        &self,
        license_id: LicenseId,
        new_status: LicenseStatus,
        actor: &str,
    ) -> EngineResult<License> {
        if new_status == LicenseStatus::Expired {
            return Err(EngineError::InvalidStatusChange(
                "EXPIRED is derived from token expiry and cannot be set directly".to_string(),
            ));
        }

        let mut license = self
            .licenses
            .find_license(license_id)?
            .ok_or(EngineError::LicenseNotFound(license_id))?;

        let previous = license.status;
        license.status = new_status;
        license.updated_at = Utc::now();
        self.licenses.update_license(&license)?;

        self.record_event(
            license.id,
            EventKind::StatusChanged,
            format!("status changed from {previous} to {new_status}"),
            actor,
        )?;

        info!(
            license_id = %license.id,
            from = %previous,
            to = %new_status,
            actor,
            "license status changed"
        );
        Ok(license)
    }

    /// Extends a license: new expiry, freshly issued token. The old token
    /// stops matching the store and is thereby no longer authoritative,
    /// whatever its signature says.
    ///
    /// A REVOKED license returns to ACTIVE unless `reactivate` is false, in
    /// which case it stays REVOKED with refreshed expiry and token. Any
    /// other prior status becomes ACTIVE.
    pub fn extend(&self, request: &ExtendRequest) -> EngineResult<License> {
        let mut license = self
            .licenses
            .find_license(request.license_id)?
            .ok_or(EngineError::LicenseNotFound(request.license_id))?;

        let new_expiry = request.new_expiry.trunc_subsecs(0);
        license.token = self
            .codec
            .issue(&license.tenant_id, &license.modules, new_expiry)?;
        license.expires_at = new_expiry;

        let previous = license.status;
        license.status = if previous == LicenseStatus::Revoked && !request.reactivate {
            LicenseStatus::Revoked
        } else {
            LicenseStatus::Active
        };
        license.updated_at = Utc::now();
        self.licenses.update_license(&license)?;

        self.record_event(
            license.id,
            EventKind::StatusChanged,
            format!(
                "license extended to {}, status {}",
                new_expiry.to_rfc3339(),
                license.status
            ),
            &request.actor,
        )?;

        info!(
            license_id = %license.id,
            new_expiry = %new_expiry,
            from = %previous,
            to = %license.status,
            "license extended"
        );
        Ok(license)
    }

    /// Looks up a license by id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::LicenseNotFound`] if absent.
    pub fn license(&self, license_id: LicenseId) -> EngineResult<License> {
        self.licenses
            .find_license(license_id)?
            .ok_or(EngineError::LicenseNotFound(license_id))
    }

    /// Returns a tenant's licenses, newest first.
    pub fn licenses_for_tenant(&self, tenant_id: &str) -> EngineResult<Vec<License>> {
        Ok(self.licenses.licenses_for_tenant(tenant_id)?)
    }

    /// Returns a license's activations, oldest first.
    pub fn activations(&self, license_id: LicenseId) -> EngineResult<Vec<Activation>> {
        self.license(license_id)?;
        Ok(self.activations.activations_for_license(license_id)?)
    }

    /// Returns a license's audit events, most recent first.
    pub fn events(&self, license_id: LicenseId) -> EngineResult<Vec<AuditEvent>> {
        self.license(license_id)?;
        Ok(self.events.events_for_license(license_id)?)
    }

    pub(crate) fn record_event(
        &self,
        license_id: LicenseId,
        kind: EventKind,
        message: impl Into<String>,
        actor: &str,
    ) -> EngineResult<()> {
        let event = AuditEvent::new(license_id, kind, message, actor);
        self.events.append_event(&event)?;
        Ok(())
    }

    /// Persists the lazily derived EXPIRED transition, if the stored
    /// status hasn't caught up with the token's expiry yet.
    pub(crate) fn mark_expired(&self, license: &License) -> EngineResult<()> {
        if license.status == LicenseStatus::Expired {
            return Ok(());
        }
        let mut updated = license.clone();
        updated.status = LicenseStatus::Expired;
        updated.updated_at = Utc::now();
        self.licenses.update_license(&updated)?;
        info!(license_id = %license.id, "license transitioned to EXPIRED");
        Ok(())
    }
}

fn module_names(modules: &[LicensedModule]) -> String {
    modules
        .iter()
        .map(LicensedModule::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
