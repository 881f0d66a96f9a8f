//! Audit event types.
//!
//! Events form an append-only forensic trail: one record per state-changing
//! or validating decision. They are never mutated or deleted, and are read
//! most-recent-first per license.

use crate::LicenseId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The category of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    /// A license was issued.
    Created,
    /// Status, expiry, or token changed by administrative action or lazy
    /// expiry.
    StatusChanged,
    /// A validation or activation call reached a terminal decision.
    Validated,
}

/// An immutable audit record of one lifecycle or validation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique identifier for this event.
    pub id: EventId,

    /// The license this event concerns.
    pub license_id: LicenseId,

    /// What kind of decision this records.
    pub kind: EventKind,

    /// Free-text description of the outcome.
    pub message: String,

    /// Who triggered it: an authenticated identity, or "system" for
    /// caller-anonymous validation.
    pub actor: String,

    /// When the event was recorded.
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates an event stamped with a fresh ID and the current time.
    #[must_use]
    pub fn new(
        license_id: LicenseId,
        kind: EventKind,
        message: impl Into<String>,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            id: EventId::new(),
            license_id,
            kind,
            message: message.into(),
            actor: actor.into(),
            created_at: Utc::now(),
        }
    }
}
