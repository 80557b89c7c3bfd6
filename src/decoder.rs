//! Payload extraction.
//!
//! This module orchestrates the decoding process:
//! 1. Read every bit the carrier holds and pack them into bytes
//! 2. Locate the frame marker and slice out the declared body
//! 3. Open the envelope when a password is given
//!
//! Unlike embedding, errors here are reported as-is: a carrier without a
//! frame gives [`StegoError::FrameNotFound`], a wrong password gives
//! [`StegoError::DecryptionFailed`].

use tracing::{debug, info};

use crate::bits::from_bits;
use crate::carrier::Carrier;
use crate::crypto;
use crate::error::StegoError;

/// Configuration for the decoder.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Password for the envelope. `None` or empty returns the body verbatim.
    pub password: Option<String>,
    /// Whether to output verbose information.
    pub verbose: bool,
}

/// Recovers the payload hidden in `carrier`.
pub fn decode(carrier: &Carrier, password: Option<&str>) -> Result<Vec<u8>, StegoError> {
    let config = DecoderConfig {
        password: password.map(str::to_string),
        verbose: false,
    };
    decode_with_config(carrier, &config)
}

/// Recovers the payload with custom configuration.
pub fn decode_with_config(carrier: &Carrier, config: &DecoderConfig) -> Result<Vec<u8>, StegoError> {
    let kind = carrier.kind();
    let bytes = from_bits(&carrier.extract());
    debug!(%kind, extracted = bytes.len(), "extracted carrier bytes");

    let body = kind.frame().unwrap(&bytes)?;
    if config.verbose {
        eprintln!("Found {} frame with {} byte body", kind, body.len());
    }

    let payload = match config.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => crypto::open(body, password)?,
        None => body.to_vec(),
    };

    info!(%kind, payload = payload.len(), "extracted payload");
    Ok(payload)
}
