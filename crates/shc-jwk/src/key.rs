//! # Key Material Capability Trait and JWK Structures
//!
//! The card encoder never touches a private key directly. It talks to the
//! [`KeyMaterial`] trait: derive the public JWK payload, sign bytes, produce
//! the thumbprint, export a publishable descriptor. This keeps the encoder
//! polymorphic over future curve/algorithm variants — curve-specific
//! validation lives in the concrete implementation, not here.
//!
//! ## Security Invariant
//!
//! `sign()` consumes the exact bytes the caller hands it and re-encodes the
//! signature as a fixed 64-byte big-endian `r ‖ s` concatenation. Each
//! component is 32 bytes, zero-padded — leading zero bytes preserved. A
//! truncated component is the classic interoperability defect in this format.

use serde::{Deserialize, Serialize};
use shc_core::CryptoError;

/// An ECDSA signature in JWS compact form: 32-byte big-endian `r` followed
/// by 32-byte big-endian `s`, both zero-padded to full width.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CompactSignature(pub [u8; 64]);

impl CompactSignature {
    /// Create a signature from raw 64 bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Parse a signature from a slice, which must be exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 64 {
            return Err(CryptoError::Verification(format!(
                "compact signature must be 64 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Return the raw 64-byte signature.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// The 32-byte big-endian `r` component.
    pub fn r(&self) -> &[u8] {
        &self.0[..32]
    }

    /// The 32-byte big-endian `s` component.
    pub fn s(&self) -> &[u8] {
        &self.0[32..]
    }
}

impl std::fmt::Debug for CompactSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix: String = self.0.iter().take(4).map(|b| format!("{b:02x}")).collect();
        write!(f, "CompactSignature({prefix}...)")
    }
}

/// The public half of an EC P-256 key in the exact shape hashed for the
/// RFC 7638 thumbprint: `{crv, kty, x, y}`.
///
/// # Invariants
///
/// - `crv` is always `"P-256"`, `kty` always `"EC"`.
/// - `x` and `y` are base64url (no padding) of exactly 32 big-endian bytes,
///   zero-padded even when the coordinate's natural encoding is shorter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkPayload {
    /// Curve name, fixed to `"P-256"`.
    pub crv: String,
    /// Key type, fixed to `"EC"`.
    pub kty: String,
    /// Base64url of the 32-byte big-endian X coordinate.
    pub x: String,
    /// Base64url of the 32-byte big-endian Y coordinate.
    pub y: String,
}

/// A publishable public-key descriptor, suitable for a JWK-set entry:
/// the payload fields plus `kid`, `use`, and `alg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicJwk {
    /// Curve name, fixed to `"P-256"`.
    pub crv: String,
    /// Key type, fixed to `"EC"`.
    pub kty: String,
    /// Base64url of the 32-byte big-endian X coordinate.
    pub x: String,
    /// Base64url of the 32-byte big-endian Y coordinate.
    pub y: String,
    /// Key identifier: the RFC 7638 thumbprint.
    pub kid: String,
    /// Key use, fixed to `"sig"`.
    #[serde(rename = "use")]
    pub usage: String,
    /// Signing algorithm, fixed to `"ES256"`.
    pub alg: String,
}

/// An EC JWK as imported from external key storage. `d` is the private
/// scalar and is present only for signing keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcJwk {
    /// Key type; must be `"EC"`.
    pub kty: String,
    /// Curve name; must be `"P-256"`.
    pub crv: String,
    /// Base64url X coordinate.
    pub x: String,
    /// Base64url Y coordinate.
    pub y: String,
    /// Base64url private scalar, if this is a signing key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

/// The capability set the card encoder requires from key material.
///
/// Implementations own the private key handle exclusively; one instance may
/// be shared across many cards. All methods are pure apart from `sign()`,
/// whose underlying primitive may touch key-storage I/O — opaque to callers.
pub trait KeyMaterial {
    /// The public JWK payload (`{crv, kty, x, y}`) derived from the key.
    fn payload(&self) -> JwkPayload;

    /// Sign `data`: ECDSA over SHA-256(data), re-encoded as the fixed
    /// 64-byte `r ‖ s` form.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Signing` if the underlying primitive fails.
    fn sign(&self, data: &[u8]) -> Result<CompactSignature, CryptoError>;

    /// The RFC 7638 thumbprint: base64url(SHA-256(canonical-JSON(payload))),
    /// no padding. Pure function of the key material; cached.
    fn thumbprint(&self) -> &str;

    /// A publishable descriptor: payload fields plus `kid` (thumbprint),
    /// `use: "sig"`, and `alg: "ES256"`.
    fn export(&self) -> PublicJwk;
}
