//! Token issuing and HMAC-SHA256 verification.
//!
//! Tokens use the format: `base64url(payload).base64url(mac)`
//!
//! Verification decodes the payload first, then checks the MAC, so a decode
//! failure and a signature mismatch are always distinguishable outcomes.
//! Expiry is judged by comparing the decoded `exp` claim against the `now`
//! the caller supplies; the MAC primitive knows nothing about time.

use crate::error::{TokenError, TokenResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, SubsecRound, Utc};
use hmac::{Hmac, Mac};
use keymill_types::LicensedModule;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Length in bytes of the HMAC-SHA256 tag carried by every token.
pub const MAC_LEN: usize = 32;

/// The symmetric signing key, fixed for the lifetime of the process.
///
/// Constructed explicitly from configuration and handed to the codec;
/// nothing in this crate reads key material from the environment. Rotating
/// the key is an operator event that invalidates every previously issued
/// token.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Creates a signing key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::EmptyKey`] if `bytes` is empty.
    pub fn from_bytes(bytes: &[u8]) -> TokenResult<Self> {
        if bytes.is_empty() {
            return Err(TokenError::EmptyKey);
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Creates a signing key from base64url-encoded configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid base64url or decodes to
    /// nothing.
    pub fn from_base64(text: &str) -> TokenResult<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(text.trim())
            .map_err(|e| TokenError::InvalidKeyEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.0).expect("HMAC accepts keys of any length")
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material.
        write!(f, "SigningKey({} bytes)", self.0.len())
    }
}

/// The decoded claims of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Tenant identifier.
    #[serde(rename = "tid")]
    pub tenant_id: String,

    /// Granted modules.
    #[serde(rename = "mods")]
    pub modules: Vec<LicensedModule>,

    /// Issued-at instant (seconds since epoch on the wire).
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiry instant (seconds since epoch on the wire).
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

/// Every possible result of checking a token.
///
/// Hostile or garbled input is data, not an error: verification never
/// returns `Err` and never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// MAC valid, payload well-formed, not yet expired.
    Ok(TokenPayload),
    /// MAC valid, payload well-formed, but `exp` is strictly before the
    /// verification time.
    Expired(TokenPayload),
    /// Well-formed token whose MAC does not match.
    InvalidSignature,
    /// Anything that cannot be decoded into the expected shape: wrong part
    /// count, bad base64, bad JSON, missing claims, truncated MAC.
    Malformed,
}

impl VerifyOutcome {
    /// Returns the decoded payload, if the signature checked out.
    #[must_use]
    pub fn payload(&self) -> Option<&TokenPayload> {
        match self {
            Self::Ok(payload) | Self::Expired(payload) => Some(payload),
            Self::InvalidSignature | Self::Malformed => None,
        }
    }
}

/// Signs and checks license tokens with a fixed symmetric key.
#[derive(Clone)]
pub struct TokenCodec {
    key: SigningKey,
}

impl TokenCodec {
    /// Creates a codec around an explicitly constructed signing key.
    #[must_use]
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Issues a signed token granting `modules` to `tenant_id` until
    /// `expires_at`.
    ///
    /// The expiry is embedded as-is: whether it lies in the future is the
    /// request schema's business, not the codec's. Instants are truncated
    /// to whole seconds, the precision the wire format carries.
    ///
    /// # Errors
    ///
    /// Returns an error if the tenant is empty or no modules are granted.
    pub fn issue(
        &self,
        tenant_id: &str,
        modules: &[LicensedModule],
        expires_at: DateTime<Utc>,
    ) -> TokenResult<String> {
        let tenant_id = tenant_id.trim();
        if tenant_id.is_empty() {
            return Err(TokenError::EmptyTenant);
        }
        if modules.is_empty() {
            return Err(TokenError::NoModules);
        }

        let payload = TokenPayload {
            tenant_id: tenant_id.to_string(),
            modules: modules.to_vec(),
            issued_at: Utc::now().trunc_subsecs(0),
            expires_at: expires_at.trunc_subsecs(0),
        };

        let payload_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?);

        let mut mac = self.key.mac();
        mac.update(payload_b64.as_bytes());
        let mac_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload_b64}.{mac_b64}"))
    }

    /// Checks a token against this codec's key and the given instant.
    ///
    /// Deterministic for a fixed key and `now`. Decode failures map to
    /// [`VerifyOutcome::Malformed`]; only a genuine MAC mismatch yields
    /// [`VerifyOutcome::InvalidSignature`].
    #[must_use]
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> VerifyOutcome {
        let token = token.trim();

        let mut parts = token.split('.');
        let (payload_b64, mac_b64) = match (parts.next(), parts.next(), parts.next()) {
            (Some(payload), Some(mac), None) => (payload, mac),
            _ => return VerifyOutcome::Malformed,
        };

        let Ok(payload_json) = URL_SAFE_NO_PAD.decode(payload_b64) else {
            return VerifyOutcome::Malformed;
        };
        let Ok(payload) = serde_json::from_slice::<TokenPayload>(&payload_json) else {
            return VerifyOutcome::Malformed;
        };

        let Ok(mac_bytes) = URL_SAFE_NO_PAD.decode(mac_b64) else {
            return VerifyOutcome::Malformed;
        };
        if mac_bytes.len() != MAC_LEN {
            return VerifyOutcome::Malformed;
        }

        let mut mac = self.key.mac();
        mac.update(payload_b64.as_bytes());
        // Constant-time comparison.
        if mac.verify_slice(&mac_bytes).is_err() {
            return VerifyOutcome::InvalidSignature;
        }

        if payload.expires_at < now {
            VerifyOutcome::Expired(payload)
        } else {
            VerifyOutcome::Ok(payload)
        }
    }
}
