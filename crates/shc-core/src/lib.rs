//! # shc-core — Foundational Types for the SMART Health Card Stack
//!
//! This crate is the bedrock of the stack. It defines the byte-production
//! primitives every downstream crate signs, hashes, or frames:
//!
//! 1. **`CanonicalBytes` newtype.** ALL hashed or signed JSON flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for thumbprints
//!    or signing bodies. Ever. Key thumbprints and signed payloads are hashes
//!    over these exact bytes, so any second serialization path is a
//!    cross-implementation interoperability defect waiting to happen.
//!
//! 2. **One base64url path.** The `b64` module is the single encode/decode
//!    route for the URL-safe, padding-stripped alphabet used by every token
//!    segment and every JWK coordinate.
//!
//! 3. **Shared error hierarchy.** `thiserror` enums per concern; downstream
//!    crates add no error types of their own.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `shc-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod b64;
pub mod canonical;
pub mod error;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, CardError, CryptoError, UriError};
