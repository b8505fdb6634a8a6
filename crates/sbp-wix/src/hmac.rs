use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::constants::SIG_PREFIX;
use crate::security::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 over the given payload bytes using the merchant secret.
/// Returns the lowercase hex-encoded MAC.
pub fn compute_hmac(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Full `sbp-sig` header value for a payload: `sha256=<hex>`.
pub fn signature_header(secret: &[u8], payload: &[u8]) -> String {
    format!("{SIG_PREFIX}{}", compute_hmac(secret, payload))
}

/// Verify a received `sbp-sig` header value against the raw payload.
///
/// The digest is always computed before comparing. The comparison rejects a
/// header of the wrong length outright and is constant-time otherwise.
pub fn verify_signature_header(secret: &[u8], payload: &[u8], received: &str) -> bool {
    let expected = signature_header(secret, payload);
    constant_time_eq(expected.as_bytes(), received.as_bytes())
}
