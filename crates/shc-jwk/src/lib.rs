//! # shc-jwk — Key Material for the SMART Health Card Stack
//!
//! Provides the key-material seam between the card encoder and whatever
//! actually holds the private key:
//!
//! - **`KeyMaterial`** — the capability trait the encoder is polymorphic
//!   over: derive the public JWK payload, sign bytes, produce the RFC 7638
//!   thumbprint, export a publishable key descriptor.
//! - **`P256KeyMaterial`** — the concrete ES256 implementation over a
//!   software P-256 key. Curve conformance is validated at construction,
//!   never discovered at signing time.
//! - **JWK structures** — `JwkPayload` (thumbprint body), `PublicJwk`
//!   (JWK-set export shape), `EcJwk` (import shape).
//!
//! ## Crate Policy
//!
//! - Depends only on `shc-core` internally.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   `CanonicalBytes`, real SHA-256, real ECDSA.
//! - Private keys are never serialized, logged, or exposed through `Debug`.

pub mod es256;
pub mod key;

pub use es256::{verify_with_payload, P256KeyMaterial};
pub use key::{CompactSignature, EcJwk, JwkPayload, KeyMaterial, PublicJwk};
