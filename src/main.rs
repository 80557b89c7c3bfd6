//! stegkit - hide payloads in images, audio, text, emoji and packet captures.

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CapacityCommand, CommandExecutor, DecodeCommand, EncodeCommand, Session};
use stegkit::StegConfig;

/// stegkit - hide payloads in ordinary media
///
/// Embeds an optionally password-protected payload in the least significant
/// bits of an image or WAV file, in invisible characters of a text, in an
/// emoji string, or in header fields of a fabricated pcap capture.
#[derive(Parser)]
#[command(name = "stegkit")]
#[command(version)]
#[command(about = "Steganography for images, audio, text, emoji and packet captures")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.stegkit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (also enables debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a message or files in a carrier
    Encode(EncodeCommand),

    /// Recover a hidden payload
    Decode(DecodeCommand),

    /// Show how many bytes a carrier can hold
    Capacity(CapacityCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => StegConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => StegConfig::load().context("Failed to load config")?,
    };
    let session = Session {
        config,
        verbose: cli.verbose,
    };

    match &cli.command {
        Commands::Encode(cmd) => cmd.execute(&session),
        Commands::Decode(cmd) => cmd.execute(&session),
        Commands::Capacity(cmd) => cmd.execute(&session),
    }
}
