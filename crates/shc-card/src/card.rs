//! # Card Encoder — JWS Compact Token Production
//!
//! Assembles the fixed ES256/DEF/JWT header, compresses the canonical
//! payload with a raw DEFLATE stream, frames the segments as padding-free
//! base64url, and signs.
//!
//! ## Security Invariant
//!
//! The signing input is the *encoded* body `header_b64 "." payload_b64`,
//! exactly as JWS compact serialization requires. Signing the pre-encoding
//! bytes produces a token no independent verifier accepts.
//!
//! ## Compression Invariant
//!
//! The payload is compressed as a raw DEFLATE stream: no zlib header, no
//! gzip framing, no trailer. `flate2::write::DeflateEncoder` produces
//! exactly this stream at the default compression level.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use shc_core::{b64, CanonicalBytes, CardError};
use shc_jwk::KeyMaterial;

/// The JOSE header of a health-card token. Algorithm, compression, and type
/// are fixed; only `kid` varies with the signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signing algorithm, always `"ES256"`.
    pub alg: String,
    /// Key identifier: the signing key's RFC 7638 thumbprint.
    pub kid: String,
    /// Token type, always `"JWT"`.
    pub typ: String,
    /// Payload compression, always `"DEF"` (raw DEFLATE).
    pub zip: String,
}

/// A health card awaiting rendering: an opaque serializable payload plus a
/// borrowed key adapter.
///
/// The adapter is shared, not owned — one key signs many cards. Rendering
/// is deterministic for a given payload and key (canonical JSON, fixed
/// compression parameters, RFC 6979 signatures).
pub struct SmartHealthCard<'k, P: Serialize> {
    payload: P,
    key: &'k dyn KeyMaterial,
}

impl<'k, P: Serialize> SmartHealthCard<'k, P> {
    /// Create a card from a payload value and a key adapter.
    pub fn new(payload: P, key: &'k dyn KeyMaterial) -> Self {
        Self { payload, key }
    }

    /// The JOSE header. `kid` is pulled fresh from the adapter on each call
    /// rather than cached at construction.
    pub fn header(&self) -> Header {
        Header {
            alg: "ES256".into(),
            kid: self.key.thumbprint().into(),
            typ: "JWT".into(),
            zip: "DEF".into(),
        }
    }

    /// Canonicalize and raw-DEFLATE the payload.
    fn compressed_payload(&self) -> Result<Vec<u8>, CardError> {
        let canonical = CanonicalBytes::new(&self.payload)?;
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(canonical.as_bytes())?;
        Ok(encoder.finish()?)
    }

    /// The signing input: `base64url(header) "." base64url(deflate(payload))`.
    fn body(&self) -> Result<String, CardError> {
        let header = CanonicalBytes::new(&self.header())?;
        Ok(format!(
            "{}.{}",
            b64::encode(header.as_bytes()),
            b64::encode(self.compressed_payload()?)
        ))
    }

    /// Render the complete three-segment token.
    ///
    /// # Errors
    ///
    /// Signing failures propagate unchanged from the adapter; compression
    /// and encoding errors are not expected for serializable payloads.
    pub fn render(&self) -> Result<String, CardError> {
        let body = self.body()?;
        let signature = self.key.sign(body.as_bytes())?;
        Ok(format!("{}.{}", body, b64::encode(signature.as_bytes())))
    }

    /// Render the token as bytes.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::render`].
    pub fn render_bytes(&self) -> Result<Vec<u8>, CardError> {
        Ok(self.render()?.into_bytes())
    }
}
