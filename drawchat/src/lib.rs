#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

pub mod board_config;
pub mod config;
pub mod keys;
pub mod link;
pub mod message;
pub mod permissions;
pub mod verify;

pub use board_config::{load_board_config, BoardConfigError};
pub use keys::{KeyFileError, Keypair};
pub use link::{build_link, Link, LinkBuilder, LinkError, DEFAULT_ENDPOINT};
pub use message::{build_config_message, build_identity_message, decode_config_message, MessageError};
pub use permissions::{Permissions, PermissionsError, Role};
pub use verify::{verify_link, ConfigCheck, ConfigParams, LinkParams, LinkParseError, LinkVerification};
