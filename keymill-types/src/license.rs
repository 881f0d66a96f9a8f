//! The authoritative server-side license record.
//!
//! A license owns exactly one *current* token at any time. Issuing a new
//! token (extension) replaces it; the old token may still carry a valid
//! signature but is no longer authoritative for validation or activation.

use crate::{LicenseId, LicensedModule};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The stored status of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    /// License is in good standing.
    Active,
    /// License was revoked by an administrator. Reversible.
    Revoked,
    /// License expired. Derived lazily from the token's expiry; reversible
    /// via extension.
    Expired,
}

impl LicenseStatus {
    /// Returns true if the stored status permits validation to succeed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns the wire name of this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Revoked => "REVOKED",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authoritative record for one issued license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    /// Unique identifier for this license.
    pub id: LicenseId,

    /// The tenant this license belongs to.
    pub tenant_id: String,

    /// Modules granted by this license. Never empty.
    pub modules: Vec<LicensedModule>,

    /// When the current token expires.
    pub expires_at: DateTime<Utc>,

    /// Stored lifecycle status.
    pub status: LicenseStatus,

    /// Maximum number of concurrent hardware activations. Always >= 1.
    pub max_activations: u32,

    /// The current signed token. Exactly one token is current at a time.
    pub token: String,

    /// Identity that requested issuance.
    pub created_by: String,

    /// When the license was issued.
    pub created_at: DateTime<Utc>,

    /// When the license was last mutated.
    pub updated_at: DateTime<Utc>,
}

impl License {
    /// Creates a freshly issued license record: status [`LicenseStatus::Active`],
    /// creation and update timestamps stamped to now.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        modules: Vec<LicensedModule>,
        expires_at: DateTime<Utc>,
        max_activations: u32,
        token: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: LicenseId::new(),
            tenant_id: tenant_id.into(),
            modules,
            expires_at,
            status: LicenseStatus::Active,
            max_activations,
            token: token.into(),
            created_by: created_by.into(),
            created_at: now,
            updated_at: now,
        }
    }
}
