//! Shared test helpers for token tests.

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use keymill_token::{SigningKey, TokenCodec};
use sha2::Sha256;

/// Fixed key bytes so tests can both build a [`SigningKey`] and compute
/// MACs independently of the codec.
pub const TEST_KEY: [u8; 32] = [
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7,
    7,
];

/// A second key, for signature-mismatch tests.
pub const OTHER_KEY: [u8; 32] = [
    9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
    9,
];

pub fn test_codec() -> TokenCodec {
    TokenCodec::new(SigningKey::from_bytes(&TEST_KEY).unwrap())
}

pub fn other_codec() -> TokenCodec {
    TokenCodec::new(SigningKey::from_bytes(&OTHER_KEY).unwrap())
}

/// Builds a token over arbitrary payload text with a correct MAC, bypassing
/// the codec's issue-side validation. Used to exercise decode failures that
/// a well-behaved issuer can never produce.
pub fn forge(key: &[u8], payload_json: &str) -> String {
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload_json.as_bytes());
    let mut mac = Hmac::<Sha256>::new_from_slice(key).unwrap();
    mac.update(payload_b64.as_bytes());
    let mac_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{payload_b64}.{mac_b64}")
}

/// Forges a token with a well-formed payload at the given instants.
pub fn forge_at(key: &[u8], tenant: &str, iat: i64, exp: i64) -> String {
    let payload = format!(r#"{{"tid":"{tenant}","mods":["CUSTOM_PORTAL"],"iat":{iat},"exp":{exp}}}"#);
    forge(key, &payload)
}
