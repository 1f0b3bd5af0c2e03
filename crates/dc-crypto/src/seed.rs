//! Board seed — a validated, type-safe wrapper for hashed board identifiers.
//!
//! A board seed is `SHA-256(board_unique_key)`, rendered as 64 lowercase hex
//! characters in links so the raw board identifier never leaves the caller.

use crate::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A 32-byte board seed.
///
/// Construct via [`BoardSeed::derive`] (from a board's unique key) or
/// [`BoardSeed::from_str`] (from the hex `bseed` query value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardSeed([u8; 32]);

/// Error returned when a string is not a valid board seed.
#[derive(Debug, thiserror::Error)]
#[error("invalid board seed: {reason}")]
pub struct BoardSeedError {
    reason: &'static str,
}

/// Length of the hex form.
const HEX_LENGTH: usize = 64;

impl BoardSeed {
    /// Derive the seed for a board's unique key.
    #[must_use]
    pub fn derive(board_unique_key: &str) -> Self {
        Self(Sha256::digest(board_unique_key.as_bytes()).into())
    }

    /// Lowercase hex form, as carried in the `bseed` parameter.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for BoardSeed {
    type Err = BoardSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HEX_LENGTH {
            return Err(BoardSeedError {
                reason: "must be exactly 64 hex characters",
            });
        }
        // Uppercase would still decode but would not match the signed bytes
        if !s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
            return Err(BoardSeedError {
                reason: "must be lowercase hex",
            });
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| BoardSeedError {
            reason: "must be lowercase hex",
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for BoardSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl serde::Serialize for BoardSeed {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_hex().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for BoardSeed {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_stable() {
        assert_eq!(
            BoardSeed::derive("MyBoardUniqueKey"),
            BoardSeed::derive("MyBoardUniqueKey")
        );
        assert_ne!(
            BoardSeed::derive("MyBoardUniqueKey"),
            BoardSeed::derive("myboarduniquekey")
        );
    }

    #[test]
    fn from_str_accepts_derived_hex() {
        let seed = BoardSeed::derive("CustomBoardId123");
        let parsed: BoardSeed = seed.to_hex().parse().expect("valid");
        assert_eq!(seed, parsed);
    }

    #[test]
    fn from_str_rejects_wrong_length() {
        assert!("abc".parse::<BoardSeed>().is_err());
        assert!("a".repeat(65).parse::<BoardSeed>().is_err());
    }

    #[test]
    fn from_str_rejects_uppercase_hex() {
        let upper = BoardSeed::derive("x").to_hex().to_uppercase();
        assert!(upper.parse::<BoardSeed>().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let seed = BoardSeed::derive("MyBoardUniqueKey");
        let json = serde_json::to_string(&seed).expect("serialize");
        assert_eq!(
            json,
            "\"f720d0469557c9548ac153e5322c6fdc8c529a094d9e6bb84e71410c726b17a0\""
        );
        let parsed: BoardSeed = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(seed, parsed);
    }

    #[test]
    fn display_matches_hex() {
        let seed = BoardSeed::derive("MyBoardUniqueKey");
        assert_eq!(format!("{seed}"), seed.to_hex());
    }
}
