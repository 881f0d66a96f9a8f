//! Hardware activation admission.
//!
//! Admission runs after effective-validity evaluation and gates each new
//! hardware id against the license's quota. Re-presenting hardware that is
//! already bound is success and consumes nothing. The count-then-insert
//! step is delegated to the store, whose atomicity contract is what keeps
//! two concurrent admissions at the last free slot from both succeeding.

use crate::engine::LicenseEngine;
use crate::error::{EngineError, EngineResult};
use crate::validation::SYSTEM_ACTOR;
use chrono::Utc;
use keymill_store::{QuotaInsert, StoreError};
use keymill_token::VerifyOutcome;
use keymill_types::{Activation, EventKind, License, LicenseStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Request to bind a hardware instance to a license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateRequest {
    /// The presented license token.
    pub token: String,
    /// Opaque hardware identifier, unique per license.
    pub hardware_id: String,
    /// Network address the request originated from, if known.
    pub source_address: Option<String>,
}

/// Why an admission call succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivationReason {
    /// A new activation slot was consumed.
    Ok,
    /// This hardware is already bound to the license; nothing changed.
    /// Success class.
    AlreadyActivated,
    /// No license row matches this token.
    NotFound,
    /// The license was revoked by an administrator.
    Revoked,
    /// The license is past its expiry.
    Expired,
    /// The token's MAC does not match.
    InvalidSignature,
    /// The token could not be decoded.
    Malformed,
    /// Every activation slot is consumed.
    MaxActivationsReached,
}

/// The result of an admission call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationDecision {
    /// True for [`ActivationReason::Ok`] and
    /// [`ActivationReason::AlreadyActivated`].
    pub activated: bool,
    /// Why.
    pub reason: ActivationReason,
    /// Ordinal position of a newly consumed slot (1-based).
    pub activation_number: Option<u32>,
    /// Slots consumed after this call.
    pub current_activations: Option<u32>,
    /// The license's quota.
    pub max_activations: Option<u32>,
}

impl ActivationDecision {
    fn rejected(reason: ActivationReason) -> Self {
        Self {
            activated: false,
            reason,
            activation_number: None,
            current_activations: None,
            max_activations: None,
        }
    }

    fn already_activated(current: u32, max: u32) -> Self {
        Self {
            activated: true,
            reason: ActivationReason::AlreadyActivated,
            activation_number: None,
            current_activations: Some(current),
            max_activations: Some(max),
        }
    }
}

impl LicenseEngine {
    /// Admits (or refuses) one hardware activation against a license.
    ///
    /// Preconditions are evaluated in order, each short-circuiting with no
    /// mutation: unknown token, revoked, expired (persisting the lazy
    /// transition), then any other codec failure surfaced verbatim. A
    /// decision that identified a license row records exactly one audit
    /// event; at most one activation row is written per call.
    ///
    /// # Errors
    ///
    /// Fails on an empty hardware id (schema violation, nothing written) or
    /// if the store does.
    pub fn admit(&self, request: &ActivateRequest) -> EngineResult<ActivationDecision> {
        let hardware_id = request.hardware_id.trim();
        if hardware_id.is_empty() {
            return Err(EngineError::InvalidRequest(
                "hardware id must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let token = request.token.trim();

        let Some(license) = self.licenses.find_by_token(token)? else {
            debug!(hardware_id, "activation rejected: unknown token");
            return Ok(ActivationDecision::rejected(ActivationReason::NotFound));
        };

        if license.status == LicenseStatus::Revoked {
            self.record_event(
                license.id,
                EventKind::Validated,
                format!("activation rejected for hardware {hardware_id}: license revoked"),
                SYSTEM_ACTOR,
            )?;
            return Ok(ActivationDecision::rejected(ActivationReason::Revoked));
        }

        match self.codec.verify(token, now) {
            VerifyOutcome::Expired(_) => {
                self.mark_expired(&license)?;
                self.record_event(
                    license.id,
                    EventKind::Validated,
                    format!("activation rejected for hardware {hardware_id}: license expired"),
                    SYSTEM_ACTOR,
                )?;
                return Ok(ActivationDecision::rejected(ActivationReason::Expired));
            }
            VerifyOutcome::InvalidSignature => {
                self.record_event(
                    license.id,
                    EventKind::Validated,
                    format!("activation rejected for hardware {hardware_id}: invalid signature"),
                    SYSTEM_ACTOR,
                )?;
                return Ok(ActivationDecision::rejected(ActivationReason::InvalidSignature));
            }
            VerifyOutcome::Malformed => {
                self.record_event(
                    license.id,
                    EventKind::Validated,
                    format!("activation rejected for hardware {hardware_id}: token malformed"),
                    SYSTEM_ACTOR,
                )?;
                return Ok(ActivationDecision::rejected(ActivationReason::Malformed));
            }
            VerifyOutcome::Ok(_) => {
                if license.status == LicenseStatus::Expired {
                    self.record_event(
                        license.id,
                        EventKind::Validated,
                        format!("activation rejected for hardware {hardware_id}: license expired"),
                        SYSTEM_ACTOR,
                    )?;
                    return Ok(ActivationDecision::rejected(ActivationReason::Expired));
                }
            }
        }

        if self
            .activations
            .find_activation(license.id, hardware_id)?
            .is_some()
        {
            return self.revalidate_existing(&license, hardware_id);
        }

        let activation = Activation::new(license.id, hardware_id, request.source_address.clone());
        match self
            .activations
            .insert_within_quota(activation, license.max_activations)
        {
            Ok(QuotaInsert::Admitted { ordinal }) => {
                self.record_event(
                    license.id,
                    EventKind::Validated,
                    format!(
                        "hardware {hardware_id} activated ({ordinal}/{})",
                        license.max_activations
                    ),
                    SYSTEM_ACTOR,
                )?;
                info!(
                    license_id = %license.id,
                    hardware_id,
                    ordinal,
                    max = license.max_activations,
                    "activation admitted"
                );
                Ok(ActivationDecision {
                    activated: true,
                    reason: ActivationReason::Ok,
                    activation_number: Some(ordinal),
                    current_activations: Some(ordinal),
                    max_activations: Some(license.max_activations),
                })
            }
            Ok(QuotaInsert::Exhausted { current, max }) => {
                self.record_event(
                    license.id,
                    EventKind::Validated,
                    format!(
                        "activation rejected for hardware {hardware_id}: quota exhausted ({current}/{max})"
                    ),
                    SYSTEM_ACTOR,
                )?;
                Ok(ActivationDecision {
                    activated: false,
                    reason: ActivationReason::MaxActivationsReached,
                    activation_number: None,
                    current_activations: Some(current),
                    max_activations: Some(max),
                })
            }
            // Lost a race against an identical admission; the uniqueness
            // backstop makes that the same as finding the row up front.
            Err(StoreError::Duplicate(_)) => self.revalidate_existing(&license, hardware_id),
            Err(err) => Err(err.into()),
        }
    }

    fn revalidate_existing(
        &self,
        license: &License,
        hardware_id: &str,
    ) -> EngineResult<ActivationDecision> {
        let current = self.activations.count_activations(license.id)?;
        self.record_event(
            license.id,
            EventKind::Validated,
            format!("hardware {hardware_id} re-validated"),
            SYSTEM_ACTOR,
        )?;
        debug!(license_id = %license.id, hardware_id, "existing hardware re-validated");
        Ok(ActivationDecision::already_activated(
            current,
            license.max_activations,
        ))
    }
}
