//! Effective-validity evaluation.
//!
//! "Is this token valid right now" combines three checks, short-circuiting
//! in order: the codec's verdict on the token itself, then whether the
//! stored license is revoked, then whether it is (or has just become)
//! expired. A token the store doesn't recognize is NOT_FOUND no matter how
//! good its signature is.

use crate::engine::LicenseEngine;
use crate::error::EngineResult;
use chrono::Utc;
use keymill_token::{TokenPayload, VerifyOutcome};
use keymill_types::{EventKind, LicenseStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Actor recorded for caller-anonymous validation and activation events.
pub const SYSTEM_ACTOR: &str = "system";

/// Why a validation call succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationReason {
    /// Token verified and the license is in good standing.
    Ok,
    /// The license (stored or decoded) is past its expiry.
    Expired,
    /// The token's MAC does not match.
    InvalidSignature,
    /// The token could not be decoded.
    Malformed,
    /// No license row matches this token.
    NotFound,
    /// The license was revoked by an administrator.
    Revoked,
}

/// The result of a validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// True only for [`ValidationReason::Ok`].
    pub valid: bool,
    /// Why.
    pub reason: ValidationReason,
    /// The decoded claims, when the signature checked out.
    pub payload: Option<TokenPayload>,
}

impl Validation {
    fn ok(payload: TokenPayload) -> Self {
        Self {
            valid: true,
            reason: ValidationReason::Ok,
            payload: Some(payload),
        }
    }

    fn rejected(reason: ValidationReason, payload: Option<TokenPayload>) -> Self {
        Self {
            valid: false,
            reason,
            payload,
        }
    }
}

impl LicenseEngine {
    /// Evaluates a presented token against the codec and the stored
    /// license state.
    ///
    /// Emits exactly one VALIDATED audit event (actor "system") whenever a
    /// license row was identified. Outcomes with no row — a token that
    /// doesn't decode, doesn't verify, or doesn't match any license — have
    /// nothing to attach an event to and leave no trace beyond a log line.
    ///
    /// As a side effect, a license whose stored status lags behind its
    /// token's expiry is persisted as EXPIRED here, before the rejection is
    /// returned.
    pub fn validate(&self, token: &str) -> EngineResult<Validation> {
        let now = Utc::now();
        let token = token.trim();

        let outcome = self.codec.verify(token, now);
        let payload = match outcome {
            VerifyOutcome::Malformed => {
                debug!("validation rejected: token malformed");
                return Ok(Validation::rejected(ValidationReason::Malformed, None));
            }
            VerifyOutcome::InvalidSignature => {
                debug!("validation rejected: invalid signature");
                return Ok(Validation::rejected(ValidationReason::InvalidSignature, None));
            }
            VerifyOutcome::Ok(ref payload) | VerifyOutcome::Expired(ref payload) => {
                payload.clone()
            }
        };

        let Some(license) = self.licenses.find_by_token(token)? else {
            debug!(tenant = %payload.tenant_id, "validation rejected: no matching license");
            return Ok(Validation::rejected(ValidationReason::NotFound, Some(payload)));
        };

        if license.status == LicenseStatus::Revoked {
            self.record_event(
                license.id,
                EventKind::Validated,
                "validation rejected: license revoked",
                SYSTEM_ACTOR,
            )?;
            return Ok(Validation::rejected(ValidationReason::Revoked, Some(payload)));
        }

        let token_expired = matches!(outcome, VerifyOutcome::Expired(_));
        if token_expired || license.status == LicenseStatus::Expired {
            self.mark_expired(&license)?;
            self.record_event(
                license.id,
                EventKind::Validated,
                "validation rejected: license expired",
                SYSTEM_ACTOR,
            )?;
            return Ok(Validation::rejected(ValidationReason::Expired, Some(payload)));
        }

        self.record_event(license.id, EventKind::Validated, "token validated", SYSTEM_ACTOR)?;
        Ok(Validation::ok(payload))
    }
}
