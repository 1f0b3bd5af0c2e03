//! The exact byte sequences that get signed.
//!
//! Any verifier has to rebuild these byte-for-byte, so the field order, the
//! `|` delimiter and the JSON canonicalization are part of the wire contract.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::Value;
use std::io::{Read, Write};

/// Errors from building or decoding a configuration payload.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[source] serde_json::Error),
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),
    #[error("decompression failed: {0}")]
    Decompression(#[source] std::io::Error),
    #[error("configuration is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
}

/// Identity claim bytes: `"{bseed}|{username}|{permissions}"` as UTF-8.
///
/// `username` is the percent-encoded form, the same string that is placed
/// in the `username` query parameter before query encoding.
#[must_use]
pub fn build_identity_message(board_seed_hex: &str, username: &str, permissions: &str) -> Vec<u8> {
    format!("{board_seed_hex}|{username}|{permissions}").into_bytes()
}

/// Canonicalize a configuration document using RFC 8785 (JCS).
///
/// Object keys are sorted and insignificant whitespace dropped, so the same
/// document always produces the same bytes regardless of insertion order.
///
/// # Errors
/// Returns an error when the document cannot be serialized.
pub fn canonical_config_json(config: &Value) -> Result<Vec<u8>, MessageError> {
    serde_jcs::to_vec(config).map_err(MessageError::Canonicalization)
}

/// Configuration payload bytes: canonical JSON, zlib-compressed at the
/// default level.
///
/// The result is both the signed message and, base64url-encoded, the
/// `config_data` parameter.
///
/// # Errors
/// Returns an error when canonicalization or compression fails.
pub fn build_config_message(config: &Value) -> Result<Vec<u8>, MessageError> {
    let json = canonical_config_json(config)?;
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(json.len() / 2), Compression::default());
    encoder
        .write_all(&json)
        .map_err(MessageError::Compression)?;
    encoder.finish().map_err(MessageError::Compression)
}

/// Inflate and parse a configuration payload produced by
/// [`build_config_message`].
///
/// The result is the canonical form, not the caller's original document.
/// Canonicalization writes integral floats without a fraction, so `1.0`
/// comes back as the integer `1`; compare numbers with `as_f64` rather than
/// `Value` equality when the input held floats.
///
/// # Errors
/// Returns an error when the bytes are not a zlib stream or do not inflate
/// to JSON.
pub fn decode_config_message(compressed: &[u8]) -> Result<Value, MessageError> {
    let mut json = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut json)
        .map_err(MessageError::Decompression)?;
    serde_json::from_slice(&json).map_err(MessageError::Parse)
}

/// Whether a configuration document should be attached to a link at all.
///
/// `null` and `{}` carry nothing for the verifier and are treated as absent.
#[must_use]
pub fn is_empty_config(config: &Value) -> bool {
    match config {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
