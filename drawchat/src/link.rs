//! Link assembly: claim fields in, signed board URL out.
//!
//! Construction is all-or-nothing. Every step either succeeds or aborts the
//! whole link; there is no partially signed output.

use dc_crypto::{
    compact_public_key, encode_base64url, percent_encode, sign, BoardSeed, KeyError,
    SignatureError, SigningKey, VerifyingKey,
};
use serde_json::Value;
use std::fmt;

use crate::keys::Keypair;
use crate::message::{build_config_message, build_identity_message, is_empty_config, MessageError};
use crate::permissions::{Permissions, PermissionsError};

/// Where draw.chat accepts signed links.
pub const DEFAULT_ENDPOINT: &str = "https://api.draw.chat/v1/open";

pub const PARAM_PUBLIC_KEY: &str = "public_key";
pub const PARAM_SIGNATURE: &str = "signature";
pub const PARAM_BSEED: &str = "bseed";
pub const PARAM_USERNAME: &str = "username";
pub const PARAM_PERMISSIONS: &str = "permissions";
pub const PARAM_CONFIG_DATA: &str = "config_data";
pub const PARAM_CONFIG_SIGNATURE: &str = "config_signature";

/// Reasons a link could not be built.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("key format error: {0}")]
    KeyFormat(#[from] KeyError),
    #[error("public key does not belong to the signing key")]
    KeyMismatch,
    #[error("configuration could not be serialized: {0}")]
    Serialization(#[from] MessageError),
    #[error(transparent)]
    Signing(#[from] SignatureError),
    #[error(transparent)]
    InvalidPermissions(#[from] PermissionsError),
}

/// A finished board link.
///
/// Parameter values are stored unescaped; [`Link::query_string`] applies
/// query encoding on output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    endpoint: String,
    params: Vec<(&'static str, String)>,
}

impl Link {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Value of a parameter before query encoding.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parameters in emission order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(key, value)| (*key, value.as_str()))
    }

    #[must_use]
    pub fn has_config(&self) -> bool {
        self.param(PARAM_CONFIG_DATA).is_some()
    }

    /// `key=value` pairs joined by `&`, each value percent-encoded.
    #[must_use]
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{key}={}", percent_encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    #[must_use]
    pub fn into_url(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.endpoint, self.query_string())
    }
}

/// Builds links signed by one key pair.
///
/// Holds only borrowed key material; a builder can be created per request
/// or shared across threads.
#[derive(Debug, Clone)]
pub struct LinkBuilder<'a> {
    private_key: &'a SigningKey,
    public_key: &'a VerifyingKey,
    endpoint: String,
}

impl<'a> LinkBuilder<'a> {
    /// # Errors
    /// Returns `LinkError::KeyMismatch` if `public_key` is not the public
    /// half of `private_key`.
    pub fn new(private_key: &'a SigningKey, public_key: &'a VerifyingKey) -> Result<Self, LinkError> {
        if private_key.verifying_key() != public_key {
            return Err(LinkError::KeyMismatch);
        }
        Ok(Self {
            private_key,
            public_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    #[must_use]
    pub fn from_keypair(keypair: &'a Keypair) -> Self {
        Self {
            private_key: keypair.private_key(),
            public_key: keypair.public_key(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Build a signed link for one user on one board.
    ///
    /// `config` is attached only when it is present and not `null` / `{}`.
    ///
    /// # Errors
    /// Returns an error if the public key cannot be encoded, the
    /// configuration cannot be serialized, or signing fails.
    pub fn build(
        &self,
        board_unique_key: &str,
        username: &str,
        permissions: &Permissions,
        config: Option<&Value>,
    ) -> Result<Link, LinkError> {
        let bseed = BoardSeed::derive(board_unique_key).to_hex();
        let public_key = compact_public_key(self.public_key)?;
        let username = percent_encode(username);
        let permissions = permissions.as_str();

        let message = build_identity_message(&bseed, &username, permissions);
        let signature = sign(self.private_key, &message)?.to_base64url();

        let mut params = vec![
            (PARAM_PUBLIC_KEY, public_key),
            (PARAM_SIGNATURE, signature),
            (PARAM_BSEED, bseed),
            (PARAM_USERNAME, username),
            (PARAM_PERMISSIONS, permissions.to_string()),
        ];

        if let Some(config) = config.filter(|c| !is_empty_config(c)) {
            let compressed = build_config_message(config)?;
            let config_signature = sign(self.private_key, &compressed)?.to_base64url();
            tracing::debug!(compressed_len = compressed.len(), "attached board configuration");
            params.push((PARAM_CONFIG_DATA, encode_base64url(&compressed)));
            params.push((PARAM_CONFIG_SIGNATURE, config_signature));
        }

        let link = Link {
            endpoint: self.endpoint.clone(),
            params,
        };
        tracing::debug!(
            bseed = link.param(PARAM_BSEED).unwrap_or_default(),
            permissions,
            with_config = link.has_config(),
            "built board link"
        );
        Ok(link)
    }
}

/// Build a link against [`DEFAULT_ENDPOINT`] from raw claim fields.
///
/// # Errors
/// Returns an error if the keys do not match, `permissions` is not a valid
/// code, or any encoding or signing step fails.
pub fn build_link(
    private_key: &SigningKey,
    public_key: &VerifyingKey,
    board_unique_key: &str,
    username: &str,
    permissions: &str,
    config: Option<&Value>,
) -> Result<Link, LinkError> {
    let permissions: Permissions = permissions.parse()?;
    LinkBuilder::new(private_key, public_key)?.build(board_unique_key, username, &permissions, config)
}
