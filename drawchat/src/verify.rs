//! Checking a link the way the draw.chat verifier does.
//!
//! Used for local self-tests and the `verify` CLI command. The query is
//! URL-decoded exactly once, which recovers the percent-encoded username
//! that the identity signature covers.

use dc_crypto::{decode_base64url, verify_compact, BoardSeed, Verification};
use serde_json::Value;
use std::collections::HashMap;

use crate::link::{
    PARAM_BSEED, PARAM_CONFIG_DATA, PARAM_CONFIG_SIGNATURE, PARAM_PERMISSIONS, PARAM_PUBLIC_KEY,
    PARAM_SIGNATURE, PARAM_USERNAME,
};
use crate::message::{build_identity_message, decode_config_message, MessageError};
use crate::permissions::Permissions;

/// Reasons a URL could not be read as a board link.
#[derive(Debug, thiserror::Error)]
pub enum LinkParseError {
    #[error("link has no query string")]
    MissingQuery,
    #[error("missing required parameter '{0}'")]
    MissingParam(&'static str),
    #[error("parameter '{0}' appears more than once")]
    DuplicateParam(String),
    #[error("parameter '{name}' is malformed: {reason}")]
    InvalidParam { name: &'static str, reason: String },
    #[error("config_data and config_signature must be present together")]
    IncompleteConfig,
}

/// Decoded query parameters of a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkParams {
    pub endpoint: String,
    pub public_key: String,
    pub signature: Vec<u8>,
    pub bseed: BoardSeed,
    /// Percent-encoded form, exactly as signed.
    pub username: String,
    pub permissions: Permissions,
    pub config: Option<ConfigParams>,
}

/// The optional configuration pair, base64url-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigParams {
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl LinkParams {
    /// Split a link URL into its parameters.
    ///
    /// Unknown parameters and any `#fragment` are ignored.
    ///
    /// # Errors
    /// Returns an error for a missing query, missing or duplicated
    /// parameters, undecodable values, or a lone config parameter.
    pub fn parse(url: &str) -> Result<Self, LinkParseError> {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (endpoint, query) = url.split_once('?').ok_or(LinkParseError::MissingQuery)?;

        let mut values: HashMap<String, String> = HashMap::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = form_decode(key).map_err(|reason| LinkParseError::InvalidParam {
                name: "query",
                reason,
            })?;
            let value = form_decode(value).map_err(|reason| LinkParseError::InvalidParam {
                name: "query",
                reason,
            })?;
            if values.insert(key.clone(), value).is_some() {
                return Err(LinkParseError::DuplicateParam(key));
            }
        }

        let mut take = |name: &'static str| values.remove(name).ok_or(LinkParseError::MissingParam(name));

        let public_key = take(PARAM_PUBLIC_KEY)?;
        let signature = decode_param(PARAM_SIGNATURE, &take(PARAM_SIGNATURE)?)?;
        let bseed = take(PARAM_BSEED)?
            .parse::<BoardSeed>()
            .map_err(|e| LinkParseError::InvalidParam {
                name: PARAM_BSEED,
                reason: e.to_string(),
            })?;
        let username = take(PARAM_USERNAME)?;
        let permissions = take(PARAM_PERMISSIONS)?
            .parse::<Permissions>()
            .map_err(|e| LinkParseError::InvalidParam {
                name: PARAM_PERMISSIONS,
                reason: e.to_string(),
            })?;

        let config = match (take(PARAM_CONFIG_DATA).ok(), take(PARAM_CONFIG_SIGNATURE).ok()) {
            (None, None) => None,
            (Some(data), Some(signature)) => Some(ConfigParams {
                data: decode_param(PARAM_CONFIG_DATA, &data)?,
                signature: decode_param(PARAM_CONFIG_SIGNATURE, &signature)?,
            }),
            _ => return Err(LinkParseError::IncompleteConfig),
        };

        Ok(Self {
            endpoint: endpoint.to_string(),
            public_key,
            signature,
            bseed,
            username,
            permissions,
            config,
        })
    }

    /// The identity message a verifier reconstructs from these parameters.
    #[must_use]
    pub fn identity_message(&self) -> Vec<u8> {
        build_identity_message(
            &self.bseed.to_hex(),
            &self.username,
            self.permissions.as_str(),
        )
    }

    /// Username as the person typed it, for display.
    #[must_use]
    pub fn display_username(&self) -> String {
        urlencoding::decode(&self.username)
            .map_or_else(|_| self.username.clone(), |name| name.into_owned())
    }
}

/// Signature and payload outcome for the configuration pair.
#[derive(Debug)]
pub struct ConfigCheck {
    pub signature: Verification,
    pub payload: Result<Value, MessageError>,
}

/// Everything a verifier learns from a link.
#[derive(Debug)]
pub struct LinkVerification {
    pub params: LinkParams,
    pub identity: Verification,
    pub config: Option<ConfigCheck>,
}

impl LinkVerification {
    /// True when the identity signature and, if present, the config
    /// signature both verify and the payload decodes.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.identity.is_valid()
            && self
                .config
                .as_ref()
                .is_none_or(|c| c.signature.is_valid() && c.payload.is_ok())
    }
}

/// Parse a link and check every signature it carries.
///
/// # Errors
/// Returns an error only if the URL is not a well-formed link; signature
/// outcomes, including `Error`, are reported in the result.
pub fn verify_link(url: &str) -> Result<LinkVerification, LinkParseError> {
    let params = LinkParams::parse(url)?;

    let identity = verify_compact(&params.public_key, &params.identity_message(), &params.signature);
    if let Verification::Error(e) = &identity {
        tracing::warn!(error = %e, "identity signature could not be checked");
    }

    let config = params.config.as_ref().map(|config| {
        let signature = verify_compact(&params.public_key, &config.data, &config.signature);
        if let Verification::Error(e) = &signature {
            tracing::warn!(error = %e, "config signature could not be checked");
        }
        ConfigCheck {
            signature,
            payload: decode_config_message(&config.data),
        }
    });

    tracing::debug!(
        bseed = %params.bseed,
        identity = identity.label(),
        config = config.as_ref().map(|c| c.signature.label()),
        "verified board link"
    );

    Ok(LinkVerification {
        params,
        identity,
        config,
    })
}

fn form_decode(raw: &str) -> Result<String, String> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| e.to_string())
}

fn decode_param(name: &'static str, value: &str) -> Result<Vec<u8>, LinkParseError> {
    decode_base64url(value).map_err(|e| LinkParseError::InvalidParam {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_link, Keypair};
    use dc_crypto::SigningKey;
    use serde_json::json;

    fn keypair() -> Keypair {
        Keypair::from_private_key(SigningKey::from_slice(&[1u8; 32]).unwrap())
    }

    fn link(username: &str, config: Option<&Value>) -> String {
        let keys = keypair();
        build_link(
            keys.private_key(),
            keys.public_key(),
            "MyBoardUniqueKey",
            username,
            "RDC___",
            config,
        )
        .unwrap()
        .into_url()
    }

    #[test]
    fn parse_recovers_signed_username() {
        let params = LinkParams::parse(&link("John Doe", None)).unwrap();
        assert_eq!(params.username, "John%20Doe");
        assert_eq!(params.display_username(), "John Doe");
        assert_eq!(params.endpoint, crate::DEFAULT_ENDPOINT);
    }

    #[test]
    fn valid_link_verifies() {
        let report = verify_link(&link("User123", None)).unwrap();
        assert!(report.identity.is_valid());
        assert!(report.config.is_none());
        assert!(report.is_valid());
    }

    #[test]
    fn tampered_permissions_are_invalid() {
        let url = link("User123", None).replace("permissions=RDC___", "permissions=RDC_X_");
        let report = verify_link(&url).unwrap();
        assert!(matches!(report.identity, Verification::Invalid));
        assert!(!report.is_valid());
    }

    #[test]
    fn config_is_verified_and_decoded() {
        let config = json!({"toolbar": ["pen", "eraser"], "defaultTool": "pen"});
        let report = verify_link(&link("User123", Some(&config))).unwrap();
        let check = report.config.as_ref().unwrap();
        assert!(check.signature.is_valid());
        assert_eq!(check.payload.as_ref().unwrap(), &config);
        assert!(report.is_valid());
    }

    #[test]
    fn forged_config_fails_the_whole_link() {
        let genuine = link("User123", Some(&json!({"defaultTool": "pen"})));
        let other = link("User123", Some(&json!({"defaultTool": "eraser"})));
        let forged_data = LinkParams::parse(&other).unwrap().config.unwrap().data;
        let genuine_data = LinkParams::parse(&genuine).unwrap().config.unwrap().data;
        let url = genuine.replace(
            &dc_crypto::encode_base64url(&genuine_data),
            &dc_crypto::encode_base64url(&forged_data),
        );

        let report = verify_link(&url).unwrap();
        assert!(report.identity.is_valid());
        assert!(matches!(
            report.config.as_ref().unwrap().signature,
            Verification::Invalid
        ));
        assert!(!report.is_valid());
    }

    #[test]
    fn missing_parameter() {
        let url = link("User123", None).replace("bseed=", "seed=");
        assert!(matches!(
            LinkParams::parse(&url),
            Err(LinkParseError::MissingParam("bseed"))
        ));
    }

    #[test]
    fn duplicate_parameter() {
        let url = format!("{}&username=other", link("User123", None));
        assert!(matches!(
            LinkParams::parse(&url),
            Err(LinkParseError::DuplicateParam(name)) if name == "username"
        ));
    }

    #[test]
    fn lone_config_parameter() {
        let url = format!("{}&config_data=eJyrrgUAAXUA-Q", link("User123", None));
        assert!(matches!(
            LinkParams::parse(&url),
            Err(LinkParseError::IncompleteConfig)
        ));
    }

    #[test]
    fn no_query() {
        assert!(matches!(
            LinkParams::parse("https://api.draw.chat/v1/open"),
            Err(LinkParseError::MissingQuery)
        ));
    }

    #[test]
    fn fragment_is_ignored() {
        let url = format!("{}#board", link("User123", None));
        assert!(verify_link(&url).unwrap().is_valid());
    }

    #[test]
    fn corrupt_public_key_is_error_not_invalid() {
        let url = link("User123", None);
        let params = LinkParams::parse(&url).unwrap();
        let url = url.replace(&params.public_key, "AAAA");
        let report = verify_link(&url).unwrap();
        assert!(matches!(report.identity, Verification::Error(_)));
    }
}
