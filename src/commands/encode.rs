//! Encode command - hide a message or files in a carrier.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use stegkit::{encode_with_config, Bundle, CarrierKind, EncoderConfig};

use super::{load_carrier, resolve_kind, CommandExecutor, Session};

/// Hide a payload in a carrier and write the result.
///
/// Image, audio and text carriers need a cover file. Emoji and network
/// carriers are generated when --carrier is omitted.
///
/// Several --file values (or --bundle) pack the files into a bundle that
/// `decode --unpack` restores.
#[derive(Args, Debug)]
pub struct EncodeCommand {
    /// Carrier kind (inferred from the carrier extension when omitted)
    #[arg(short, long, value_enum)]
    pub kind: Option<CarrierKind>,

    /// Cover file
    #[arg(short, long)]
    pub carrier: Option<PathBuf>,

    /// Text message to hide
    #[arg(short, long, conflicts_with_all = ["file", "stdin"])]
    pub message: Option<String>,

    /// File(s) to hide
    #[arg(short, long, num_args = 1.., conflicts_with = "stdin")]
    pub file: Vec<PathBuf>,

    /// Read the payload from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Pack a single --file into a bundle as well
    #[arg(long, requires = "file")]
    pub bundle: bool,

    /// Password for the encryption envelope
    #[arg(short, long)]
    pub password: Option<String>,

    /// Where to write the carrier with the hidden payload
    #[arg(short, long)]
    pub output: PathBuf,
}

impl CommandExecutor for EncodeCommand {
    fn execute(&self, session: &Session) -> Result<()> {
        let kind = resolve_kind(self.kind, self.carrier.as_deref())?;
        let carrier = load_carrier(kind, self.carrier.as_deref(), session)?;

        let payload = self.read_payload(session.verbose)?;

        let config = EncoderConfig {
            password: self.password.clone(),
            verbose: session.verbose,
        };
        let stego = encode_with_config(&carrier, &payload, &config)
            .with_context(|| format!("Failed to embed payload in {} carrier", kind))?;

        if kind == CarrierKind::Image && !has_extension(&self.output, "png") {
            eprintln!("Warning: image carriers are always written as PNG");
        }

        stego
            .save(&self.output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        eprintln!(
            "Hid {} bytes in {} ({} carrier, capacity {} bytes)",
            payload.len(),
            self.output.display(),
            kind,
            carrier.capacity()
        );
        Ok(())
    }
}

impl EncodeCommand {
    fn read_payload(&self, verbose: bool) -> Result<Vec<u8>> {
        if let Some(message) = &self.message {
            return Ok(message.as_bytes().to_vec());
        }

        if self.file.len() > 1 || self.bundle {
            let mut bundle = Bundle::new();
            for path in &self.file {
                bundle
                    .add_file(path)
                    .with_context(|| format!("Failed to add {} to bundle", path.display()))?;
            }
            let packed = bundle.to_bytes().context("Failed to pack bundle")?;
            if verbose {
                eprintln!("Packed {} files into {} bytes", bundle.len(), packed.len());
            }
            return Ok(packed);
        }

        if let Some(path) = self.file.first() {
            return std::fs::read(path).with_context(|| format!("Failed to read file {}", path.display()));
        }

        if self.stdin {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read payload from stdin")?;
            return Ok(buffer);
        }

        bail!("No payload given. Use --message, --file or --stdin")
    }
}

fn has_extension(path: &std::path::Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
