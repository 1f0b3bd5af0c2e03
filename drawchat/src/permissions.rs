//! Six-slot permission codes understood by the draw.chat verifier.
//!
//! | Slot | Meaning | Values            |
//! |------|---------|-------------------|
//! | 1    | role    | `R` admin, `A` user |
//! | 2    | draw    | `D` / `_`         |
//! | 3    | chat    | `C` / `_`         |
//! | 4-6  | reserved | `_` by convention |

use std::fmt;
use std::str::FromStr;

/// Exact length of a permission code.
pub const PERMISSIONS_LENGTH: usize = 6;

const PLACEHOLDER: u8 = b'_';
const DELIMITER: u8 = b'|';

/// The role carried in slot 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `R`: board administrator (teacher).
    Admin,
    /// `A`: regular participant (student).
    User,
}

impl Role {
    const fn code(self) -> u8 {
        match self {
            Self::Admin => b'R',
            Self::User => b'A',
        }
    }

    const fn from_code(code: u8) -> Option<Self> {
        match code {
            b'R' => Some(Self::Admin),
            b'A' => Some(Self::User),
            _ => None,
        }
    }
}

/// A validated permission code.
///
/// Construct via [`Permissions::new`] from typed flags or parse an existing
/// code with [`Permissions::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permissions(String);

/// Error returned when a string is not a usable permission code.
#[derive(Debug, thiserror::Error)]
#[error("invalid permission code '{code}': {reason}")]
pub struct PermissionsError {
    code: String,
    reason: &'static str,
}

impl Permissions {
    /// Build a code from typed flags; reserved slots are left as `_`.
    #[must_use]
    pub fn new(role: Role, can_draw: bool, can_chat: bool) -> Self {
        let mut code = [PLACEHOLDER; PERMISSIONS_LENGTH];
        code[0] = role.code();
        if can_draw {
            code[1] = b'D';
        }
        if can_chat {
            code[2] = b'C';
        }
        Self(code.iter().map(|&b| char::from(b)).collect())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Role from slot 1, `None` if the slot holds an unrecognised letter.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        Role::from_code(self.0.as_bytes()[0])
    }

    #[must_use]
    pub fn can_draw(&self) -> bool {
        self.0.as_bytes()[1] == b'D'
    }

    #[must_use]
    pub fn can_chat(&self) -> bool {
        self.0.as_bytes()[2] == b'C'
    }
}

impl FromStr for Permissions {
    type Err = PermissionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reject = |reason| PermissionsError {
            code: s.to_string(),
            reason,
        };
        if !s.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(reject("must be printable ASCII"));
        }
        if s.len() != PERMISSIONS_LENGTH {
            return Err(reject("must be exactly 6 characters"));
        }
        // The pipe separates fields of the signed identity message
        if s.bytes().any(|b| b == DELIMITER) {
            return Err(reject("must not contain '|'"));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for Permissions {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Permissions {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
