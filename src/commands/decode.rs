//! Decode command - recover a hidden payload from a carrier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stegkit::{decode_with_config, Bundle, CarrierKind, DecoderConfig};

use super::{load_carrier, resolve_kind, CommandExecutor, Session};

/// Recover a payload hidden by `encode`.
///
/// Use -o/--output to write raw bytes to a file (required for binary data).
/// Without -o, output is printed as text (lossy UTF-8 conversion).
#[derive(Args, Debug)]
pub struct DecodeCommand {
    /// Carrier kind (inferred from the carrier extension when omitted)
    #[arg(short, long, value_enum)]
    pub kind: Option<CarrierKind>,

    /// Carrier holding the payload
    #[arg(short, long)]
    pub carrier: PathBuf,

    /// Password used when encoding
    #[arg(short, long)]
    pub password: Option<String>,

    /// Output file for the recovered payload
    #[arg(short, long, conflicts_with = "unpack")]
    pub output: Option<PathBuf>,

    /// Treat the payload as a bundle and extract its files into this directory
    #[arg(long)]
    pub unpack: Option<PathBuf>,
}

impl CommandExecutor for DecodeCommand {
    fn execute(&self, session: &Session) -> Result<()> {
        let kind = resolve_kind(self.kind, Some(&self.carrier))?;
        let carrier = load_carrier(kind, Some(&self.carrier), session)?;

        let config = DecoderConfig {
            password: self.password.clone(),
            verbose: session.verbose,
        };
        let payload = decode_with_config(&carrier, &config)
            .with_context(|| format!("Failed to extract payload from {}", self.carrier.display()))?;

        if let Some(dir) = &self.unpack {
            let bundle = Bundle::from_bytes(&payload).context("Payload is not a valid bundle")?;
            let written = bundle
                .unpack_to(dir)
                .with_context(|| format!("Failed to unpack into {}", dir.display()))?;
            for path in &written {
                eprintln!("  {}", path.display());
            }
            eprintln!("Unpacked {} files to {}", written.len(), dir.display());
        } else if let Some(output_path) = &self.output {
            std::fs::write(output_path, &payload)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Decoded {} bytes to {}", payload.len(), output_path.display());
        } else {
            println!("{}", String::from_utf8_lossy(&payload));
        }
        Ok(())
    }
}
