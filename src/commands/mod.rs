//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod capacity;
mod decode;
mod encode;

pub use capacity::CapacityCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use stegkit::{Carrier, CarrierKind, StegConfig};

/// State shared by every command: loaded configuration and global flags.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: StegConfig,
    pub verbose: bool,
}

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self, session: &Session) -> Result<()>;
}

/// Picks the carrier kind from `--kind` or, failing that, the file extension.
fn resolve_kind(kind: Option<CarrierKind>, path: Option<&Path>) -> Result<CarrierKind> {
    if let Some(kind) = kind {
        return Ok(kind);
    }
    let path = path.ok_or_else(|| anyhow!("--kind is required when no carrier file is given"))?;
    CarrierKind::from_path(path).ok_or_else(|| {
        anyhow!(
            "Cannot infer carrier kind from {}; pass --kind",
            path.display()
        )
    })
}

/// Loads the cover file, or generates an empty carrier for emoji/network.
fn load_carrier(kind: CarrierKind, path: Option<&Path>, session: &Session) -> Result<Carrier> {
    let carrier = match path {
        Some(path) => Carrier::from_file(kind, path, &session.config)
            .with_context(|| format!("Failed to read {} carrier from {}", kind, path.display()))?,
        None => Carrier::fresh(kind, &session.config)?,
    };

    if session.verbose {
        eprintln!(
            "Loaded {} ({} usable bits, {} bytes capacity)",
            describe(&carrier),
            carrier.usable_bits(),
            carrier.capacity()
        );
    }
    Ok(carrier)
}

/// One-line summary of a carrier for verbose output.
fn describe(carrier: &Carrier) -> String {
    match carrier {
        Carrier::Image(image) => {
            let (width, height) = image.dimensions();
            let alpha = if image.has_alpha() { "RGBA" } else { "RGB" };
            format!("image carrier {}x{} {}", width, height, alpha)
        }
        Carrier::Audio(audio) => format!(
            "audio carrier {}-bit, {} ch, {:.2}s",
            audio.spec().bits_per_sample,
            audio.spec().channels,
            audio.duration_secs()
        ),
        Carrier::Text(text) => format!("text carrier ({:?})", text.scheme()),
        Carrier::Emoji(emoji) => format!("emoji carrier ({} bits per symbol)", emoji.bits_per_symbol().bits()),
        Carrier::Network(stream) => format!("network carrier ({} packets)", stream.values().len()),
    }
}
