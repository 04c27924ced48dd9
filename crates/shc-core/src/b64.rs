//! # Base64url Framing
//!
//! The single encode/decode path for the URL-safe, padding-stripped base64
//! alphabet used throughout the token format: JWK coordinates, thumbprints,
//! and all three segments of the compact serialization.
//!
//! Padding is stripped on encode and rejected on decode. A `=` anywhere in a
//! token segment means the token was produced by a non-conforming encoder.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Encode bytes as base64url without padding.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a padding-free base64url string.
///
/// # Errors
///
/// Returns `base64::DecodeError` for characters outside the URL-safe
/// alphabet, for padding characters, or for an invalid length.
pub fn decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(s)
}
