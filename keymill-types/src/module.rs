//! The fixed enumeration of licensable modules.
//!
//! A license grants access to a non-empty subset of these modules. The set
//! is closed: requests naming anything else are rejected at the schema
//! boundary before reaching the engine.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A product module a license can grant access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicensedModule {
    /// White-labelled customer portal.
    CustomPortal,
    /// Usage analytics dashboards.
    Analytics,
    /// Scheduled and ad-hoc reporting.
    Reporting,
    /// Programmatic API access.
    ApiAccess,
}

impl LicensedModule {
    /// Every module in the closed set, in display order.
    pub const ALL: [Self; 4] = [
        Self::CustomPortal,
        Self::Analytics,
        Self::Reporting,
        Self::ApiAccess,
    ];

    /// Returns the wire name of this module.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CustomPortal => "CUSTOM_PORTAL",
            Self::Analytics => "ANALYTICS",
            Self::Reporting => "REPORTING",
            Self::ApiAccess => "API_ACCESS",
        }
    }
}

impl fmt::Display for LicensedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicensedModule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOM_PORTAL" => Ok(Self::CustomPortal),
            "ANALYTICS" => Ok(Self::Analytics),
            "REPORTING" => Ok(Self::Reporting),
            "API_ACCESS" => Ok(Self::ApiAccess),
            other => Err(Error::UnknownModule(other.to_string())),
        }
    }
}
