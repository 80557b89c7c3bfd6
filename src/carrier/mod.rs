//! Carrier media that can host a framed payload.
//!
//! Supports:
//! - Image LSB steganography (PNG, BMP, TIFF in; PNG out)
//! - Audio LSB steganography (8/16-bit PCM WAV)
//! - Zero-width / trailing-whitespace text
//! - Emoji symbol strings
//! - Synthetic packet captures (IP identification / TCP ISN)

pub mod audio;
pub mod emoji;
pub mod image;
pub mod network;
pub mod text;

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::capacity::{self, CapacityReport};
use crate::config::StegConfig;
use crate::error::StegoError;
use crate::frame::{FrameSpec, AUDIO_FRAME, EMOJI_FRAME, IMAGE_FRAME, NETWORK_FRAME, TEXT_FRAME};

pub use self::audio::AudioCarrier;
pub use self::emoji::{BitsPerSymbol, EmojiCarrier};
pub use self::image::ImageCarrier;
pub use self::network::{PacketField, PacketStream};
pub use self::text::{TextCarrier, TextScheme};

/// The closed set of carrier kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CarrierKind {
    Image,
    Audio,
    Text,
    Emoji,
    Network,
}

impl CarrierKind {
    /// Frame layout used by this kind.
    pub fn frame(self) -> &'static FrameSpec {
        match self {
            CarrierKind::Image => &IMAGE_FRAME,
            CarrierKind::Audio => &AUDIO_FRAME,
            CarrierKind::Text => &TEXT_FRAME,
            CarrierKind::Emoji => &EMOJI_FRAME,
            CarrierKind::Network => &NETWORK_FRAME,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CarrierKind::Image => "image",
            CarrierKind::Audio => "audio",
            CarrierKind::Text => "text",
            CarrierKind::Emoji => "emoji",
            CarrierKind::Network => "network",
        }
    }

    /// Guesses the kind from a file extension. Emoji strings have no
    /// distinctive extension and must be requested explicitly.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" | "bmp" | "tif" | "tiff" | "jpg" | "jpeg" | "webp" => Some(CarrierKind::Image),
            "wav" | "wave" => Some(CarrierKind::Audio),
            "pcap" | "cap" => Some(CarrierKind::Network),
            "txt" | "md" | "text" => Some(CarrierKind::Text),
            _ => None,
        }
    }
}

impl std::fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Common interface of every carrier medium.
///
/// `embed` never mutates `self`; it returns a modified copy.
pub trait CarrierAdapter: Sized {
    fn kind(&self) -> CarrierKind;

    /// Number of addressable positions (channel bytes, samples, slots, ...).
    fn usable_units(&self) -> usize;

    /// Bits stored per addressable position.
    fn bits_per_unit(&self) -> usize {
        1
    }

    fn usable_bits(&self) -> usize {
        self.usable_units().saturating_mul(self.bits_per_unit())
    }

    /// Payload bytes this carrier can hold without a password.
    fn capacity(&self) -> usize {
        capacity::capacity_bytes(self.usable_bits(), self.kind().frame())
    }

    fn capacity_report(&self) -> CapacityReport {
        CapacityReport::new(
            self.kind().name(),
            self.usable_units(),
            self.bits_per_unit(),
            self.kind().frame(),
        )
    }

    /// Writes `bits` from the first unit onward into a copy of the carrier.
    ///
    /// Fails with [`StegoError::PayloadTooLarge`] before touching anything if
    /// `bits` exceeds [`CarrierAdapter::usable_bits`].
    fn embed(&self, bits: &[u8]) -> Result<Self, StegoError>;

    /// Reads every bit the carrier holds, in embedding order.
    fn extract(&self) -> Vec<u8>;

    /// Serializes the carrier to its (lossless) container format.
    fn to_bytes(&self) -> Result<Vec<u8>, StegoError>;
}

/// A loaded carrier of any kind.
#[derive(Debug, Clone)]
pub enum Carrier {
    Image(ImageCarrier),
    Audio(AudioCarrier),
    Text(TextCarrier),
    Emoji(EmojiCarrier),
    Network(PacketStream),
}

macro_rules! dispatch {
    ($self:expr, $c:ident => $body:expr) => {
        match $self {
            Carrier::Image($c) => $body,
            Carrier::Audio($c) => $body,
            Carrier::Text($c) => $body,
            Carrier::Emoji($c) => $body,
            Carrier::Network($c) => $body,
        }
    };
}

impl Carrier {
    /// Parses carrier container bytes of the given kind.
    ///
    /// Text and emoji carriers take UTF-8; emoji, text and network settings
    /// come from `config`.
    pub fn from_bytes(kind: CarrierKind, bytes: &[u8], config: &StegConfig) -> Result<Self, StegoError> {
        match kind {
            CarrierKind::Image => Ok(Carrier::Image(ImageCarrier::from_bytes(bytes)?)),
            CarrierKind::Audio => Ok(Carrier::Audio(AudioCarrier::from_bytes(bytes)?)),
            CarrierKind::Text => {
                let text = utf8(bytes)?;
                Ok(Carrier::Text(TextCarrier::with_config(text, &config.text)))
            }
            CarrierKind::Emoji => {
                let text = utf8(bytes)?;
                Ok(Carrier::Emoji(EmojiCarrier::with_config(text, &config.emoji)))
            }
            CarrierKind::Network => Ok(Carrier::Network(PacketStream::from_pcap_bytes(
                bytes,
                &config.network,
            )?)),
        }
    }

    /// Reads a carrier file of the given kind.
    pub fn from_file<P: AsRef<Path>>(kind: CarrierKind, path: P, config: &StegConfig) -> Result<Self, StegoError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(kind, &bytes, config)
    }

    /// Creates an empty carrier for kinds that are generated rather than
    /// loaded (emoji strings and packet captures).
    pub fn fresh(kind: CarrierKind, config: &StegConfig) -> Result<Self, StegoError> {
        match kind {
            CarrierKind::Emoji => Ok(Carrier::Emoji(EmojiCarrier::with_config("", &config.emoji))),
            CarrierKind::Network => Ok(Carrier::Network(PacketStream::with_config(&config.network))),
            other => Err(StegoError::CarrierLoad(format!(
                "a cover file is required for {} carriers",
                other
            ))),
        }
    }

    pub fn kind(&self) -> CarrierKind {
        dispatch!(self, c => c.kind())
    }

    pub fn usable_bits(&self) -> usize {
        dispatch!(self, c => c.usable_bits())
    }

    pub fn capacity(&self) -> usize {
        dispatch!(self, c => c.capacity())
    }

    pub fn capacity_report(&self) -> CapacityReport {
        dispatch!(self, c => c.capacity_report())
    }

    pub fn embed(&self, bits: &[u8]) -> Result<Self, StegoError> {
        Ok(match self {
            Carrier::Image(c) => Carrier::Image(c.embed(bits)?),
            Carrier::Audio(c) => Carrier::Audio(c.embed(bits)?),
            Carrier::Text(c) => Carrier::Text(c.embed(bits)?),
            Carrier::Emoji(c) => Carrier::Emoji(c.embed(bits)?),
            Carrier::Network(c) => Carrier::Network(c.embed(bits)?),
        })
    }

    pub fn extract(&self) -> Vec<u8> {
        dispatch!(self, c => c.extract())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StegoError> {
        dispatch!(self, c => c.to_bytes())
    }

    /// Writes the carrier container to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), StegoError> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, StegoError> {
    std::str::from_utf8(bytes)
        .map_err(|e| StegoError::UnsupportedCarrierFormat(format!("carrier is not valid UTF-8: {}", e)))
}
