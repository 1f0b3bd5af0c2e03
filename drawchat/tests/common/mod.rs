//! Common test utilities for integration tests.
//!
//! [`KeypairFactory`] builds deterministic key pairs so failures reproduce,
//! and [`demo_config`] mirrors the board configuration shipped in `demos/`.

use drawchat_link::Keypair;
use dc_crypto::SigningKey;
use serde_json::{json, Value};

/// Builder for test key pairs with sensible defaults.
///
/// # Examples
///
/// ```rust
/// let keys = KeypairFactory::new().build();
/// let other = KeypairFactory::new().with_seed(42).build();
/// ```
pub struct KeypairFactory {
    seed: u8,
}

impl KeypairFactory {
    #[must_use]
    pub const fn new() -> Self {
        Self { seed: 1 }
    }

    /// Different seeds produce different key pairs.
    #[must_use]
    pub const fn with_seed(mut self, seed: u8) -> Self {
        self.seed = seed;
        self
    }

    /// # Panics
    /// Panics if the seed is zero, which is not a valid P-256 scalar.
    #[must_use]
    pub fn build(self) -> Keypair {
        let private_key = SigningKey::from_slice(&[self.seed; 32]).expect("valid scalar");
        Keypair::from_private_key(private_key)
    }
}

/// The board configuration from the demo scripts.
#[must_use]
pub fn demo_config() -> Value {
    json!({
        "features": {
            "displayChat": false,
            "displayChatWebrtc": false,
            "displayCrosshair": false,
            "displayPages": true,
            "displayToolbar": true,
            "displayViewports": false,
        },
        "toolbar": [
            "download", "pen", "highlighter", "colorpicker", "undo-redo", "eraser",
            "move-viewport", "rotate-viewport", "zoom", "center", "connection-status",
        ],
        "defaultTool": "pen",
        "pages": {
            "1": {
                "backgroundColor": "#F9FEE7",
                "backgroundImage": "https://imagehost.pro/templates/grid_2000.svg",
                "foregroundImage": "https://imagehost.pro/templates/colouring_cat.svg",
            },
            "2": {
                "backgroundColor": "#FEF9E7",
                "backgroundImage": "https://upload.wikimedia.org/wikipedia/commons/1/17/A-DNA_orbit_animated_small.gif",
            },
            "3": { "backgroundColor": "LightSeaGreen" },
        },
    })
}

/// Query value of `name` in a rendered URL, still query-encoded.
#[must_use]
pub fn raw_query_value<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
