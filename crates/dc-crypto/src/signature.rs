//! ECDSA P-256/SHA-256 signatures in fixed-width (IEEE P1363) form.
//!
//! Links carry signatures as `r || s`, each a 32-byte big-endian integer,
//! so the base64 length is always the same and verifiers never need an
//! ASN.1 parser.

use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use std::fmt;

use crate::{encode_base64url, parse_compact_public_key, KeyError};

/// Length of a fixed-width signature: two 32-byte scalars.
pub const SIGNATURE_LENGTH: usize = 64;
const SCALAR_LENGTH: usize = 32;

/// Errors from signing or from decoding signature bytes.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("signature must be {SIGNATURE_LENGTH} bytes, got {0}")]
    InvalidLength(usize),
    #[error("malformed DER signature: {0}")]
    MalformedDer(String),
}

/// Why a verification could not reach a yes/no answer.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

/// Outcome of checking a signature.
///
/// `Invalid` means the signature is well-formed but does not match the
/// message and key. `Error` means the check itself could not run.
#[derive(Debug)]
pub enum Verification {
    Valid,
    Invalid,
    Error(VerifyError),
}

impl Verification {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Short label for logs and CLI output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Error(_) => "error",
        }
    }
}

/// A fixed-width `r || s` signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct P1363Signature([u8; SIGNATURE_LENGTH]);

impl P1363Signature {
    /// # Errors
    ///
    /// Returns `SignatureError::InvalidLength` unless `bytes` is exactly 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        let fixed: [u8; SIGNATURE_LENGTH] = bytes
            .try_into()
            .map_err(|_| SignatureError::InvalidLength(bytes.len()))?;
        Ok(Self(fixed))
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Big-endian `r` component.
    #[must_use]
    pub fn r(&self) -> &[u8] {
        &self.0[..SCALAR_LENGTH]
    }

    /// Big-endian `s` component.
    #[must_use]
    pub fn s(&self) -> &[u8] {
        &self.0[SCALAR_LENGTH..]
    }

    /// The form carried in `signature` and `config_signature` parameters.
    #[must_use]
    pub fn to_base64url(&self) -> String {
        encode_base64url(&self.0)
    }

    fn from_signature(signature: &Signature) -> Self {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes.copy_from_slice(&signature.to_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for P1363Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("P1363Signature")
            .field(&hex::encode(self.0))
            .finish()
    }
}

/// Sign `message` with ECDSA over SHA-256(message).
///
/// Nonces are derived per RFC 6979, so signing the same message with the
/// same key yields the same signature.
///
/// # Errors
///
/// Returns `SignatureError::Signing` if the underlying operation fails.
pub fn sign(private_key: &SigningKey, message: &[u8]) -> Result<P1363Signature, SignatureError> {
    let signature: Signature = private_key
        .try_sign(message)
        .map_err(|e| SignatureError::Signing(e.to_string()))?;
    Ok(P1363Signature::from_signature(&signature))
}

/// Convert an ASN.1 DER signature into fixed-width form.
///
/// Each integer is left zero-padded to 32 bytes. Integers wider than the
/// curve order are rejected rather than truncated.
///
/// # Errors
///
/// Returns `SignatureError::MalformedDer` for anything that is not a valid
/// P-256 DER signature.
pub fn der_to_p1363(der: &[u8]) -> Result<P1363Signature, SignatureError> {
    let signature =
        Signature::from_der(der).map_err(|e| SignatureError::MalformedDer(e.to_string()))?;
    Ok(P1363Signature::from_signature(&signature))
}

/// Check a fixed-width signature over `message`.
///
/// Never fails: malformed input surfaces as [`Verification::Error`] with the
/// cause attached, a mismatch as [`Verification::Invalid`].
#[must_use]
pub fn verify(public_key: &VerifyingKey, message: &[u8], signature: &[u8]) -> Verification {
    let fixed = match P1363Signature::from_slice(signature) {
        Ok(fixed) => fixed,
        Err(e) => return Verification::Error(e.into()),
    };
    // Zero or out-of-range scalars cannot come from an honest signer
    let Ok(signature) = Signature::from_slice(fixed.as_bytes()) else {
        return Verification::Invalid;
    };
    match public_key.verify(message, &signature) {
        Ok(()) => Verification::Valid,
        Err(_) => Verification::Invalid,
    }
}

/// Check a signature against a public key in its `public_key` parameter form.
#[must_use]
pub fn verify_compact(compact_public_key: &str, message: &[u8], signature: &[u8]) -> Verification {
    match parse_compact_public_key(compact_public_key) {
        Ok(public_key) => verify(&public_key, message, signature),
        Err(e) => Verification::Error(e.into()),
    }
}
