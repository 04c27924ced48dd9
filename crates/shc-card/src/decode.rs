//! # Token Decoder — Round-Trip and Verification
//!
//! The inverse of the encoder: split the three segments, base64url-decode,
//! inflate the raw DEFLATE payload, parse header and payload JSON, and
//! optionally re-verify the signature over the encoded body.
//!
//! Decoding keeps the original base64url segments around: the signature
//! covers `header_b64 "." payload_b64` exactly as transmitted, so
//! verification must use those bytes, never a re-serialization.

use std::io::Read;

use flate2::read::DeflateDecoder;
use shc_core::{b64, CardError, CryptoError};
use shc_jwk::{verify_with_payload, CompactSignature, JwkPayload, P256KeyMaterial};

use crate::card::Header;

/// A decoded health-card token.
#[derive(Debug, Clone)]
pub struct DecodedCard {
    /// The parsed JOSE header.
    pub header: Header,
    /// The inflated, parsed payload.
    pub payload: serde_json::Value,
    header_b64: String,
    payload_b64: String,
    signature: CompactSignature,
}

impl DecodedCard {
    /// Parse a three-segment token.
    ///
    /// # Errors
    ///
    /// - `CardError::Malformed` if the token does not have exactly three
    ///   segments or the signature is not 64 bytes.
    /// - `CardError::Base64` for a segment outside the padding-free
    ///   base64url alphabet.
    /// - `CardError::Deflate` if the payload is not a valid raw DEFLATE
    ///   stream.
    /// - `CardError::Json` if the header or inflated payload is not JSON.
    pub fn parse(token: &str) -> Result<Self, CardError> {
        let mut segments = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (segments.next(), segments.next(), segments.next(), segments.next()) {
                (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => {
                    (h, p, s)
                }
                _ => {
                    return Err(CardError::Malformed(
                        "expected exactly three non-empty '.'-separated segments".into(),
                    ))
                }
            };

        let header: Header =
            serde_json::from_slice(&b64::decode(header_b64)?).map_err(CardError::Json)?;

        let compressed = b64::decode(payload_b64)?;
        let mut inflated = Vec::new();
        DeflateDecoder::new(compressed.as_slice()).read_to_end(&mut inflated)?;
        let payload: serde_json::Value =
            serde_json::from_slice(&inflated).map_err(CardError::Json)?;

        let signature_bytes = b64::decode(signature_b64)?;
        let signature = CompactSignature::from_slice(&signature_bytes)
            .map_err(|e| CardError::Malformed(e.to_string()))?;

        Ok(Self {
            header,
            payload,
            header_b64: header_b64.to_string(),
            payload_b64: payload_b64.to_string(),
            signature,
        })
    }

    /// The exact byte string the signature covers:
    /// `header_b64 "." payload_b64` as transmitted.
    pub fn signed_body(&self) -> String {
        format!("{}.{}", self.header_b64, self.payload_b64)
    }

    /// The token's signature in compact `r ‖ s` form.
    pub fn signature(&self) -> &CompactSignature {
        &self.signature
    }

    /// Verify the signature against a public JWK payload.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Verification` on mismatch, plus the structural
    /// errors of [`verify_with_payload`].
    pub fn verify(&self, payload: &JwkPayload) -> Result<(), CryptoError> {
        verify_with_payload(payload, &self.signature, self.signed_body().as_bytes())
    }

    /// Verify the signature against the signer's own key material.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Verification` on mismatch.
    pub fn verify_with_key(&self, key: &P256KeyMaterial) -> Result<(), CryptoError> {
        key.verify(&self.signature, self.signed_body().as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::SmartHealthCard;
    use shc_core::CanonicalBytes;
    use shc_jwk::KeyMaterial;

    fn fixed_key() -> P256KeyMaterial {
        P256KeyMaterial::from_secret_bytes(&[42u8; 32]).expect("fixed scalar is valid")
    }

    #[test]
    fn test_parse_roundtrip() {
        let key = fixed_key();
        let payload = serde_json::json!({"a": 1, "nested": {"b": [1, 2, 3]}});
        let token = SmartHealthCard::new(&payload, &key).render().unwrap();

        let decoded = DecodedCard::parse(&token).expect("parse should succeed");
        assert_eq!(decoded.payload, payload);
        assert_eq!(decoded.header.kid, key.thumbprint());
        assert_eq!(decoded.header.zip, "DEF");
    }

    #[test]
    fn test_payload_segment_inflates_to_canonical_json() {
        let key = fixed_key();
        let payload = serde_json::json!({"b": 2, "a": 1});
        let token = SmartHealthCard::new(&payload, &key).render().unwrap();

        let payload_b64 = token.split('.').nth(1).unwrap();
        let compressed = b64::decode(payload_b64).unwrap();
        let mut inflated = Vec::new();
        DeflateDecoder::new(compressed.as_slice())
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(
            inflated,
            CanonicalBytes::new(&payload).unwrap().as_bytes()
        );
    }

    #[test]
    fn test_verify_paths() {
        let key = fixed_key();
        let token = SmartHealthCard::new(serde_json::json!({"a": 1}), &key)
            .render()
            .unwrap();
        let decoded = DecodedCard::parse(&token).unwrap();
        decoded.verify_with_key(&key).expect("key verification");
        decoded.verify(&key.payload()).expect("payload verification");
    }

    #[test]
    fn test_tampered_payload_fails_verification() {
        let key = fixed_key();
        let token = SmartHealthCard::new(serde_json::json!({"a": 1}), &key)
            .render()
            .unwrap();
        let other = SmartHealthCard::new(serde_json::json!({"a": 2}), &key)
            .render()
            .unwrap();

        // Splice the other token's payload segment into the first token.
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_payload = other.split('.').nth(1).unwrap();
        parts[1] = other_payload;
        let spliced = parts.join(".");

        let decoded = DecodedCard::parse(&spliced).unwrap();
        assert!(decoded.verify_with_key(&key).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_segment_count() {
        assert!(matches!(
            DecodedCard::parse("onlyone"),
            Err(CardError::Malformed(_))
        ));
        assert!(matches!(
            DecodedCard::parse("a.b"),
            Err(CardError::Malformed(_))
        ));
        assert!(matches!(
            DecodedCard::parse("a.b.c.d"),
            Err(CardError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_segment() {
        assert!(matches!(
            DecodedCard::parse("a..c"),
            Err(CardError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_padded_base64() {
        let key = fixed_key();
        let token = SmartHealthCard::new(serde_json::json!({"a": 1}), &key)
            .render()
            .unwrap();
        let padded = format!("{token}=");
        assert!(matches!(
            DecodedCard::parse(&padded),
            Err(CardError::Base64(_))
        ));
    }

    #[test]
    fn test_parse_rejects_undeflatable_payload() {
        let key = fixed_key();
        let token = SmartHealthCard::new(serde_json::json!({"a": 1}), &key)
            .render()
            .unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        // Valid base64url, not a deflate stream.
        let bogus = b64::encode(b"not deflate");
        parts[1] = &bogus;
        let spliced = parts.join(".");
        assert!(matches!(
            DecodedCard::parse(&spliced),
            Err(CardError::Deflate(_) | CardError::Json(_))
        ));
    }

    #[test]
    fn test_parse_rejects_short_signature() {
        let key = fixed_key();
        let token = SmartHealthCard::new(serde_json::json!({"a": 1}), &key)
            .render()
            .unwrap();
        let body = token.rsplit_once('.').unwrap().0;
        let truncated = format!("{}.{}", body, b64::encode([0u8; 16]));
        assert!(matches!(
            DecodedCard::parse(&truncated),
            Err(CardError::Malformed(_))
        ));
    }
}
