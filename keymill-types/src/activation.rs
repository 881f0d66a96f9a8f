//! Hardware activation records.

use crate::LicenseId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hardware instance consuming one quota slot of a license.
///
/// At most one activation exists per (license, hardware) pair. Activations
/// are never deleted: quota consumption is permanent, and revoking the
/// license does not release its slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    /// The license this activation consumes a slot of.
    pub license_id: LicenseId,

    /// Opaque hardware identifier supplied by the activating client.
    /// Unique per license.
    pub hardware_id: String,

    /// Network address the activation request originated from, if known.
    pub source_address: Option<String>,

    /// When the activation was admitted.
    pub created_at: DateTime<Utc>,
}

impl Activation {
    /// Creates an activation record stamped to now.
    #[must_use]
    pub fn new(
        license_id: LicenseId,
        hardware_id: impl Into<String>,
        source_address: Option<String>,
    ) -> Self {
        Self {
            license_id,
            hardware_id: hardware_id.into(),
            source_address,
            created_at: Utc::now(),
        }
    }
}
