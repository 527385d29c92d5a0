//! Request authentication signatures
//!
//! The upstream API authenticates every call with an HMAC-SHA256 signature
//! over the concatenation of partner id, full API path, unix timestamp,
//! access token and shop id, keyed by the partner secret and rendered as
//! lowercase hex. The output must byte-exactly match what the upstream
//! computes or every request fails with an authentication error.

use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Compute the request signature for a shop-scoped API call
///
/// Pure function: same inputs always produce the same 64-char lowercase hex
/// string.
pub fn sign(
    partner_key: &str,
    partner_id: u64,
    path: &str,
    timestamp: i64,
    access_token: &str,
    shop_id: u64,
) -> String {
    let base = format!("{partner_id}{path}{timestamp}{access_token}{shop_id}");
    let mut mac = Hmac::<Sha256>::new_from_slice(partner_key.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(base.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
