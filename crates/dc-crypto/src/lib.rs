//! Shared cryptographic utilities for draw.chat board links
//!
//! This crate provides the canonical encoders, board seed derivation and
//! P-256 signing used by the link builder (as a native library) and by
//! browser code that needs to derive identical values (compiled to WASM).

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
pub(crate) use sha2::{Digest, Sha256};
use wasm_bindgen::prelude::*;

mod encoding;
pub use encoding::{pem_to_compact, percent_encode, to_url_safe_base64};

mod keys;
pub use keys::{
    compact_public_key, parse_compact_public_key, parse_private_key_pem, parse_public_key_pem,
    private_key_pem, public_key_pem, KeyError,
};

mod seed;
pub use seed::{BoardSeed, BoardSeedError};

mod signature;
pub use signature::{
    der_to_p1363, sign, verify, verify_compact, P1363Signature, SignatureError, Verification,
    VerifyError, SIGNATURE_LENGTH,
};

pub use p256::ecdsa::{SigningKey, VerifyingKey};

/// URL-safe engine that decodes with or without trailing `=` padding.
const URL_SAFE_INDIFFERENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    NO_PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Error type for base64url decoding failures
#[derive(Debug, thiserror::Error)]
#[error("invalid base64url encoding: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// Derive the hex board seed for a board's unique key.
///
/// Computed as `hex(SHA-256(board_unique_key))`, always 64 lowercase
/// hex characters.
#[wasm_bindgen]
#[must_use]
pub fn board_seed_hex(board_unique_key: &str) -> String {
    BoardSeed::derive(board_unique_key).to_hex()
}

/// Encode bytes as base64url (RFC 4648) without padding.
///
/// Identical to standard base64 passed through [`to_url_safe_base64`].
#[wasm_bindgen]
#[must_use]
pub fn encode_base64url(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Percent-encode a username for the identity message (WASM binding).
#[wasm_bindgen(js_name = "percent_encode")]
#[must_use]
pub fn percent_encode_js(text: &str) -> String {
    percent_encode(text)
}

/// Decode a base64url-encoded string (RFC 4648) to bytes (WASM binding).
///
/// For native Rust code, use [`decode_base64url`] instead.
///
/// # Errors
/// Returns `JsError` if the input is not valid base64url
#[wasm_bindgen(js_name = "decode_base64url")]
pub fn decode_base64url_js(encoded: &str) -> Result<Vec<u8>, JsError> {
    URL_SAFE_INDIFFERENT
        .decode(encoded)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Decode a base64url-encoded string (RFC 4648) to bytes.
///
/// Accepts input with or without padding, so verifiers do not need to
/// restore the `=` characters stripped during link construction.
///
/// # Errors
/// Returns `DecodeError` if the input is not valid base64url
pub fn decode_base64url(encoded: &str) -> Result<Vec<u8>, DecodeError> {
    URL_SAFE_INDIFFERENT
        .decode(encoded)
        .map_err(DecodeError::from)
}
