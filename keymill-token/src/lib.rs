//! Signed license tokens for Keymill.
//!
//! This crate produces and checks the compact, tamper-evident credential a
//! client presents to prove what it was granted:
//! - Token issuing: HMAC-SHA256 over a JSON payload of tenant, modules, and
//!   expiry
//! - Token verification with a closed outcome type (valid / expired /
//!   invalid signature / malformed) — hostile input never raises
//! - Explicit, immutable signing-key configuration
//!
//! # Token Format
//!
//! Tokens are formatted as: `base64url(payload).base64url(mac)`
//! The payload is a JSON object carrying:
//! - `tid`: tenant identifier
//! - `mods`: granted module names
//! - `iat`: issued-at timestamp (seconds since epoch)
//! - `exp`: expiry timestamp (seconds since epoch)
//!
//! The MAC covers `payload_b64.as_bytes()` (the base64url-encoded payload
//! string, not the decoded JSON). A token is self-contained: anyone holding
//! the signing key can check it offline. Whether it is *authoritative* is
//! the license record's business, not this crate's.

mod codec;
mod error;

pub use codec::{SigningKey, TokenCodec, TokenPayload, VerifyOutcome, MAC_LEN};
pub use error::{TokenError, TokenResult};
