//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types used throughout the stack. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every failure is synchronous and surfaced to the immediate caller.
//! - No internal retries or silent recovery: signing and encoding are
//!   one-shot deterministic operations with no partial-success state.
//! - Cryptographic errors fail loudly with full context.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error in cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key material is not on the required curve. Detected eagerly at
    /// construction, never discovered at signing time.
    #[error("key is not an EC P-256 key: kty={kty}, crv={crv}")]
    InvalidCurve {
        /// The `kty` field the key material presented.
        kty: String,
        /// The `crv` field the key material presented.
        crv: String,
    },

    /// The underlying signing primitive failed. Not retried internally;
    /// the caller owns retry policy for remote or hardware-backed keys.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Signature does not match. Raised only on the verify path, never
    /// during card production.
    #[error("signature verification failed: {0}")]
    Verification(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    Key(String),

    /// Canonicalization failed while deriving the thumbprint body.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Error while producing or decoding a card token.
#[derive(Error, Debug)]
pub enum CardError {
    /// Canonicalization of the header or payload failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Key material operation failed.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The DEFLATE stream could not be written or read.
    #[error("deflate stream error: {0}")]
    Deflate(#[from] std::io::Error),

    /// A token segment is not valid padding-free base64url.
    #[error("base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The token does not have the expected three-segment structure.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// A decoded token segment is not valid JSON.
    #[error("invalid JSON in token segment: {0}")]
    Json(serde_json::Error),
}

/// Error in the `shc:/` URI transform.
#[derive(Error, Debug)]
pub enum UriError {
    /// A token character falls outside the numeric-mode-mappable range
    /// `45..=125`. The encoder only emits base64url plus `.`, so hitting
    /// this means the input was not a token produced by this stack.
    #[error("token character {ch:?} at index {index} is outside the numeric-mode range 45..=125")]
    EncodingRange {
        /// The offending character.
        ch: char,
        /// Its position in the token.
        index: usize,
    },

    /// Requested chunk count is zero or exceeds the digit-string length.
    #[error("invalid chunk count {requested} for digit string of length {digits}")]
    InvalidChunkCount {
        /// The chunk count the caller asked for.
        requested: usize,
        /// The digit-string length being chunked.
        digits: usize,
    },

    /// A URI does not have the `shc:/` shape, or a chunk set is
    /// inconsistent (duplicate, missing, or disagreeing indices).
    #[error("malformed shc uri: {0}")]
    Malformed(String),
}
