//! Payload embedding.
//!
//! This module orchestrates the encoding process:
//! 1. Seal the payload in an envelope when a password is given
//! 2. Check the sealed body fits the carrier
//! 3. Wrap it in the carrier kind's frame (marker + length)
//! 4. Expand to bits and write them into a copy of the carrier

use tracing::info;

use crate::bits::to_bits;
use crate::capacity::check_fits;
use crate::carrier::Carrier;
use crate::crypto;
use crate::error::StegoError;

/// Configuration for the encoder.
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Password for the envelope. `None` or empty stores the payload in clear.
    pub password: Option<String>,
    /// Whether to output verbose information.
    pub verbose: bool,
}

/// Embeds `payload` into a copy of `carrier`.
///
/// The original carrier is never modified. Fails with
/// [`StegoError::PayloadTooLarge`] without writing anything when the framed
/// payload does not fit.
pub fn encode(carrier: &Carrier, payload: &[u8], password: Option<&str>) -> Result<Carrier, StegoError> {
    let config = EncoderConfig {
        password: password.map(str::to_string),
        verbose: false,
    };
    encode_with_config(carrier, payload, &config)
}

/// Embeds `payload` with custom configuration.
pub fn encode_with_config(carrier: &Carrier, payload: &[u8], config: &EncoderConfig) -> Result<Carrier, StegoError> {
    let kind = carrier.kind();
    let frame = kind.frame();

    let body = match config.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => crypto::seal(payload, password)?,
        None => payload.to_vec(),
    };

    if config.verbose {
        eprintln!(
            "Payload: {} bytes, body: {} bytes, {} carrier holds {} bytes",
            payload.len(),
            body.len(),
            kind,
            carrier.capacity()
        );
    }

    check_fits(body.len(), carrier.usable_bits(), frame)?;

    let framed = frame.wrap(&body)?;
    let stego = carrier.embed(&to_bits(&framed))?;

    info!(%kind, payload = payload.len(), framed = framed.len(), "embedded payload");
    Ok(stego)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::audio::create_test_audio;
    use crate::carrier::{CarrierAdapter, CarrierKind, EmojiCarrier, ImageCarrier};
    use crate::config::EmojiConfig;
    use crate::crypto::ENVELOPE_OVERHEAD;

    fn small_image() -> Carrier {
        Carrier::Image(ImageCarrier::from_image(image::DynamicImage::new_rgb8(16, 16)).unwrap())
    }

    #[test]
    fn test_encode_keeps_original_untouched() {
        let carrier = small_image();
        let before = carrier.extract();

        let stego = encode(&carrier, b"secret", None).unwrap();

        assert_eq!(carrier.extract(), before);
        assert_ne!(stego.extract(), before);
    }

    #[test]
    fn test_encode_at_capacity() {
        let carrier = Carrier::Audio(create_test_audio(1000, 16));
        let capacity = carrier.capacity();

        assert!(encode(&carrier, &vec![0x5A; capacity], None).is_ok());
        let result = encode(&carrier, &vec![0x5A; capacity + 1], None);
        assert!(matches!(result, Err(StegoError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_password_adds_envelope_overhead() {
        let carrier = Carrier::Audio(create_test_audio(1000, 16));
        let fits = carrier.capacity() - ENVELOPE_OVERHEAD;

        assert!(encode(&carrier, &vec![1; fits], Some("pw")).is_ok());
        let result = encode(&carrier, &vec![1; fits + 1], Some("pw"));
        assert!(matches!(result, Err(StegoError::PayloadTooLarge { .. })));
    }

    #[test]
    fn test_empty_password_means_no_envelope() {
        let carrier = Carrier::Audio(create_test_audio(1000, 16));
        let capacity = carrier.capacity();

        assert!(encode(&carrier, &vec![1; capacity], Some("")).is_ok());
    }

    #[test]
    fn test_encode_generated_emoji_carrier() {
        let config = EmojiConfig::default();
        let carrier = Carrier::Emoji(EmojiCarrier::with_config("", &config));

        let stego = encode(&carrier, b"hi", None).unwrap();

        assert_eq!(stego.kind(), CarrierKind::Emoji);
        // (12 marker + 4 length + 2 payload) bytes * 8 bits / 2 bits per symbol
        let Carrier::Emoji(emoji) = stego else {
            panic!("expected emoji carrier");
        };
        assert_eq!(emoji.as_str().chars().count(), 72);
        assert_eq!(emoji.usable_units(), config.max_symbols);
    }
}
