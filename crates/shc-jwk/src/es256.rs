//! # ES256 Key Material — ECDSA P-256 over SHA-256
//!
//! The concrete [`KeyMaterial`] implementation backing card production.
//!
//! ## Security Invariant
//!
//! - Curve conformance is checked eagerly: `from_jwk` rejects anything that
//!   is not an EC P-256 key at construction, so a non-conforming key can
//!   never reach the signing path.
//! - Signatures leave the native `(r, s)` representation immediately: the
//!   stored form is always the fixed 64-byte big-endian concatenation with
//!   each component zero-padded to 32 bytes.
//! - Private keys are never serialized or logged. `P256KeyMaterial` does not
//!   implement `Serialize` and its `Debug` shows only the kid.
//!
//! ## Determinism
//!
//! Signing uses RFC 6979 deterministic nonces, so the same key and message
//! always produce the same signature. The thumbprint and public payload are
//! pure functions of the key and are computed once at construction.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::DecodePrivateKey;
use sha2::{Digest, Sha256};
use shc_core::{b64, CanonicalBytes, CryptoError};

use crate::key::{CompactSignature, EcJwk, JwkPayload, KeyMaterial, PublicJwk};

/// An EC P-256 signing key with its derived public payload and thumbprint.
///
/// Safe to share across threads and across many cards; the only non-pure
/// operation is `sign()`, and software P-256 keys are safe for concurrent
/// use. Does not implement `Serialize` — private keys must not leak into
/// logs, responses, or artifacts.
pub struct P256KeyMaterial {
    signing_key: SigningKey,
    payload: JwkPayload,
    thumbprint: String,
}

impl P256KeyMaterial {
    /// Generate a new random P-256 key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Canonicalization` if the thumbprint body cannot
    /// be serialized (not expected for the fixed payload shape).
    pub fn generate() -> Result<Self, CryptoError> {
        let mut csprng = rand::rngs::OsRng;
        Self::from_signing_key(SigningKey::random(&mut csprng))
    }

    /// Create key material from a raw 32-byte big-endian secret scalar.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Key` if the scalar is zero or not less than the
    /// curve order.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::Key(format!("invalid P-256 secret scalar: {e}")))?;
        Self::from_signing_key(signing_key)
    }

    /// Create key material from a PKCS#8 PEM-encoded private key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Key` if the PEM document cannot be parsed or
    /// does not hold a P-256 private key.
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_pkcs8_pem(pem)
            .map_err(|e| CryptoError::Key(format!("invalid PKCS#8 key: {e}")))?;
        Self::from_signing_key(signing_key)
    }

    /// Create key material from an imported JWK.
    ///
    /// The curve check happens here, at construction — a key on the wrong
    /// curve is rejected before it can ever be asked to sign.
    ///
    /// # Errors
    ///
    /// - `CryptoError::InvalidCurve` if `kty` is not `"EC"` or `crv` is not
    ///   `"P-256"`.
    /// - `CryptoError::Key` if the private scalar is absent or invalid, or
    ///   if the stated public coordinates do not match the derived ones.
    pub fn from_jwk(jwk: &EcJwk) -> Result<Self, CryptoError> {
        if jwk.kty != "EC" || jwk.crv != "P-256" {
            return Err(CryptoError::InvalidCurve {
                kty: jwk.kty.clone(),
                crv: jwk.crv.clone(),
            });
        }
        let d = jwk
            .d
            .as_deref()
            .ok_or_else(|| CryptoError::Key("JWK has no private scalar 'd'".into()))?;
        let d_bytes = decode_coordinate(d, "d")?;
        let material = Self::from_secret_bytes(&d_bytes)?;

        // The imported x/y must agree with the scalar they came with.
        if material.payload.x != jwk.x || material.payload.y != jwk.y {
            return Err(CryptoError::Key(
                "JWK public coordinates do not match the private scalar".into(),
            ));
        }
        Ok(material)
    }

    /// Create key material from a JWK JSON string.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Key` for unparseable JSON, plus everything
    /// [`Self::from_jwk`] can return.
    pub fn from_jwk_str(json: &str) -> Result<Self, CryptoError> {
        let jwk: EcJwk = serde_json::from_str(json)
            .map_err(|e| CryptoError::Key(format!("invalid JWK JSON: {e}")))?;
        Self::from_jwk(&jwk)
    }

    fn from_signing_key(signing_key: SigningKey) -> Result<Self, CryptoError> {
        let payload = derive_payload(&signing_key)?;
        let canonical = CanonicalBytes::new(&payload)?;
        let thumbprint = b64::encode(Sha256::digest(canonical.as_bytes()));
        Ok(Self {
            signing_key,
            payload,
            thumbprint,
        })
    }

    /// The verifying (public) half of this key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Verify a compact `r ‖ s` signature over `data` with this key's
    /// public half. Inverse of [`KeyMaterial::sign`]; used by external
    /// consumers, never during card production.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Verification` if the signature cannot be
    /// reconstructed from the 64-byte form or does not match.
    pub fn verify(&self, signature: &CompactSignature, data: &[u8]) -> Result<(), CryptoError> {
        let sig = Signature::from_slice(signature.as_bytes())
            .map_err(|e| CryptoError::Verification(format!("invalid r‖s encoding: {e}")))?;
        self.signing_key
            .verifying_key()
            .verify(data, &sig)
            .map_err(|e| CryptoError::Verification(format!("ES256 verification failed: {e}")))
    }
}

impl KeyMaterial for P256KeyMaterial {
    fn payload(&self) -> JwkPayload {
        self.payload.clone()
    }

    fn sign(&self, data: &[u8]) -> Result<CompactSignature, CryptoError> {
        let sig: Signature = self
            .signing_key
            .try_sign(data)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&sig.to_bytes());
        Ok(CompactSignature::from_bytes(bytes))
    }

    fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    fn export(&self) -> PublicJwk {
        PublicJwk {
            crv: self.payload.crv.clone(),
            kty: self.payload.kty.clone(),
            x: self.payload.x.clone(),
            y: self.payload.y.clone(),
            kid: self.thumbprint.clone(),
            usage: "sig".into(),
            alg: "ES256".into(),
        }
    }
}

impl std::fmt::Debug for P256KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P256KeyMaterial(kid: {}, <private>)", self.thumbprint)
    }
}

/// Verify a compact `r ‖ s` signature using only a public JWK payload.
///
/// This is the path an external consumer without the private key uses:
/// reconstruct the verifying key from the published `x`/`y` coordinates and
/// check the signature over SHA-256(data).
///
/// # Errors
///
/// - `CryptoError::InvalidCurve` if the payload is not EC P-256.
/// - `CryptoError::Key` if the coordinates do not form a valid curve point.
/// - `CryptoError::Verification` if the signature does not match.
pub fn verify_with_payload(
    payload: &JwkPayload,
    signature: &CompactSignature,
    data: &[u8],
) -> Result<(), CryptoError> {
    if payload.kty != "EC" || payload.crv != "P-256" {
        return Err(CryptoError::InvalidCurve {
            kty: payload.kty.clone(),
            crv: payload.crv.clone(),
        });
    }
    let x: p256::FieldBytes = decode_coordinate(&payload.x, "x")?.into();
    let y: p256::FieldBytes = decode_coordinate(&payload.y, "y")?.into();
    let point = p256::EncodedPoint::from_affine_coordinates(&x, &y, false);
    let verifying_key = VerifyingKey::from_encoded_point(&point)
        .map_err(|e| CryptoError::Key(format!("invalid public point: {e}")))?;
    let sig = Signature::from_slice(signature.as_bytes())
        .map_err(|e| CryptoError::Verification(format!("invalid r‖s encoding: {e}")))?;
    verifying_key
        .verify(data, &sig)
        .map_err(|e| CryptoError::Verification(format!("ES256 verification failed: {e}")))
}

/// Derive the JWK payload from the public point.
///
/// The SEC1 uncompressed encoding already carries each affine coordinate as
/// exactly 32 big-endian bytes, zero-padded — the width the thumbprint body
/// requires.
fn derive_payload(signing_key: &SigningKey) -> Result<JwkPayload, CryptoError> {
    let point = signing_key.verifying_key().to_encoded_point(false);
    let x = point
        .x()
        .ok_or_else(|| CryptoError::Key("public point has no affine x coordinate".into()))?;
    let y = point
        .y()
        .ok_or_else(|| CryptoError::Key("public point has no affine y coordinate".into()))?;
    Ok(JwkPayload {
        crv: "P-256".into(),
        kty: "EC".into(),
        x: b64::encode(x),
        y: b64::encode(y),
    })
}

/// Decode a base64url JWK field that must be exactly 32 bytes.
fn decode_coordinate(value: &str, field: &str) -> Result<[u8; 32], CryptoError> {
    let bytes = b64::decode(value)
        .map_err(|e| CryptoError::Key(format!("JWK field '{field}' is not base64url: {e}")))?;
    if bytes.len() != 32 {
        return Err(CryptoError::Key(format!(
            "JWK field '{field}' must decode to 32 bytes, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 32];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
