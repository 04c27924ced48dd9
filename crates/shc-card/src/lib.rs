//! # shc-card — SMART Health Card Tokens and URIs
//!
//! Produces signed health-credential tokens in JWS compact serialization and
//! renders them as QR-friendly `shc:/` URIs:
//!
//! - **`SmartHealthCard`** — the encoder: canonical JSON payload, raw
//!   DEFLATE compression, base64url framing, ES256 signature over the
//!   encoded `header.payload` body.
//! - **`DecodedCard`** — the round-trip half: split, decode, inflate, and
//!   re-verify a token.
//! - **`ShcUri`** — the numeric-mode URI transform and chunker for
//!   size-constrained multi-QR presentation.
//!
//! ## Crate Policy
//!
//! - Every operation is a pure, synchronous transformation; the only
//!   externally visible effect is the key adapter's signing call.
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.

pub mod card;
pub mod decode;
pub mod uri;

pub use card::{Header, SmartHealthCard};
pub use decode::DecodedCard;
pub use uri::{assemble, decode_digits, Chunks, ShcUri, MAX_CHUNK_SIZE};
