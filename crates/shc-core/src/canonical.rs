//! # Canonical Serialization — Deterministic JSON Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! that get hashed (JWK thumbprints) or compressed and signed (card payloads).
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which serializes via
//! RFC 8785 (JSON Canonicalization Scheme): strictly ascending lexicographic
//! key order, compact `,` / `:` separators, standard JSON escapes, UTF-8.
//!
//! This makes the "wrong serialization path" defect class structurally
//! impossible: any function that hashes or signs JSON must accept
//! `&CanonicalBytes`, and the only way to produce one is through the
//! canonical pipeline. An independent verifier recomputing the thumbprint or
//! checking the signature sees byte-identical input regardless of the
//! insertion order of the source structure.

use serde::Serialize;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS-compatible canonicalization.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - Object keys appear in strictly ascending lexicographic order.
/// - No whitespace beyond the minimal `,` and `:` separators.
/// - The same logical value always yields byte-identical output.
///
/// These invariants are enforced by the constructor and cannot be violated
/// by downstream code because the inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// This is the ONLY way to construct `CanonicalBytes`. All thumbprint
    /// and signing-body computation in the stack must flow through here.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::SerializationFailed` if the value
    /// cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let s = serde_jcs::to_string(obj)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes for hashing, compression, or signing.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
