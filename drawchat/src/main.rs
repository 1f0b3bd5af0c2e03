#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]
#![allow(clippy::print_stdout)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use drawchat_link::{
    config::{Config, DEFAULT_CONFIG_FILE},
    load_board_config, verify_link, Keypair, LinkBuilder, Permissions,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "drawchat-link", version, about = "Signed draw.chat board links")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a new P-256 key pair at the configured paths.
    Keygen {
        /// Replace existing key files.
        #[arg(long)]
        force: bool,
    },
    /// Print a signed link for one user on one board.
    Link {
        /// The board's unique key; only its SHA-256 leaves this machine.
        #[arg(long)]
        board: String,
        #[arg(long)]
        username: String,
        /// Six-slot permission code, e.g. RDC___ or AD____.
        #[arg(long, default_value = "RDC___")]
        permissions: Permissions,
        /// JSON board configuration (features, toolbar, pages).
        #[arg(long)]
        config_file: Option<PathBuf>,
        /// Add the current time in milliseconds as `timestamp` in the configuration.
        #[arg(long)]
        timestamp: bool,
    },
    /// Check the signatures on a link.
    Verify { url: String },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load and validate configuration first (fail-fast)
    let config = Config::load_from(&cli.config).map_err(|e| anyhow::anyhow!("{e}"))?;

    let filter = EnvFilter::try_new(&config.logging.level)
        .with_context(|| format!("invalid logging.level '{}'", config.logging.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Keygen { force } => {
            let keypair = Keypair::generate();
            keypair.write(
                &config.keys.private_key_path,
                &config.keys.public_key_path,
                force,
            )?;
            println!("New keys generated.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Link {
            board,
            username,
            permissions,
            config_file,
            timestamp,
        } => {
            let keypair = Keypair::load(&config.keys.private_key_path, &config.keys.public_key_path)?;
            let board_config = load_board_config(config_file.as_deref(), timestamp)?;
            let link = LinkBuilder::from_keypair(&keypair)
                .with_endpoint(config.link.endpoint.as_str())
                .build(&board, &username, &permissions, board_config.as_ref())?;
            println!("{link}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { url } => {
            let report = verify_link(&url)?;
            println!("board seed:       {}", report.params.bseed);
            println!("username:         {}", report.params.display_username());
            println!("permissions:      {}", report.params.permissions);
            println!("identity:         {}", report.identity.label());
            if let Some(check) = &report.config {
                println!("config signature: {}", check.signature.label());
                match &check.payload {
                    Ok(payload) => println!("config:           {payload}"),
                    Err(e) => println!("config:           unreadable ({e})"),
                }
            }
            Ok(if report.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
