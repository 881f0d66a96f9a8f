//! Shared test helpers for engine tests.

#![allow(dead_code)]

use keymill_engine::{ActivateRequest, ActivationDecision, IssueRequest, LicenseEngine};
use keymill_store::MemoryStore;
use keymill_token::{SigningKey, TokenCodec};
use keymill_types::{License, LicensedModule};
use std::sync::Arc;

pub const TEST_KEY: [u8; 32] = [42; 32];

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(SigningKey::from_bytes(&TEST_KEY).unwrap())
}

/// An engine over a fresh in-memory store and the fixed test key.
pub fn test_engine() -> LicenseEngine {
    let store = Arc::new(MemoryStore::new());
    LicenseEngine::new(test_codec(), store.clone(), store.clone(), store)
}

/// Issues a CUSTOM_PORTAL license expiring `days` from now (negative for
/// already-expired licenses — issuance doesn't validate expiry).
pub fn issue_days(engine: &LicenseEngine, tenant: &str, days: i64, max: u32) -> License {
    engine
        .issue(&IssueRequest {
            tenant_id: tenant.to_string(),
            modules: vec![LicensedModule::CustomPortal],
            expires_at: chrono::Utc::now() + chrono::Duration::days(days),
            max_activations: max,
            created_by: "admin".to_string(),
        })
        .unwrap()
}

pub fn admit(engine: &LicenseEngine, token: &str, hardware_id: &str) -> ActivationDecision {
    engine
        .admit(&ActivateRequest {
            token: token.to_string(),
            hardware_id: hardware_id.to_string(),
            source_address: None,
        })
        .unwrap()
}
