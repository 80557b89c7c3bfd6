//! # stegkit - hide payloads in ordinary media
//!
//! stegkit embeds an arbitrary byte payload into a carrier and recovers it
//! later. Five carrier kinds are supported:
//!
//! - **Image**: least significant bit of the R, G and B channels (PNG, BMP,
//!   TIFF in; PNG out). Alpha is never touched.
//! - **Audio**: least significant bit of every PCM sample (8/16-bit WAV).
//! - **Text**: zero-width characters or trailing whitespace.
//! - **Emoji**: a string of emoji symbols, 2 or 3 bits each.
//! - **Network**: IPv4 identification or TCP ISN fields of a fabricated
//!   pcap capture.
//!
//! Every payload is framed with a kind-specific marker and a big-endian
//! length, so a decoder finds it without knowing its size. An optional
//! password seals the payload with Argon2id + ChaCha20-Poly1305 first.
//!
//! ## Example Usage
//!
//! ```rust
//! use stegkit::carrier::{Carrier, CarrierKind};
//! use stegkit::config::StegConfig;
//! use stegkit::{decode, encode};
//!
//! let config = StegConfig::default();
//! let cover = Carrier::fresh(CarrierKind::Emoji, &config).unwrap();
//!
//! let stego = encode(&cover, b"meet at noon", None).unwrap();
//! let bytes = stego.to_bytes().unwrap();
//!
//! let loaded = Carrier::from_bytes(CarrierKind::Emoji, &bytes, &config).unwrap();
//! assert_eq!(decode(&loaded, None).unwrap(), b"meet at noon");
//! ```
//!
//! ## Modules
//!
//! - [`bits`]: byte/bit expansion (MSB first)
//! - [`frame`]: marker + length framing per carrier kind
//! - [`crypto`]: password envelope
//! - [`capacity`]: capacity arithmetic and reports
//! - [`carrier`]: the carrier adapters
//! - [`encoder`] / [`decoder`]: the embed and extract pipelines
//! - [`bundle`]: packing several files into one payload
//! - [`config`]: `~/.stegkit/config.toml`

pub mod bits;
pub mod bundle;
pub mod capacity;
pub mod carrier;
pub mod config;
pub mod crypto;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;

// Re-export commonly used types at the crate root
pub use bundle::{Bundle, BundleEntry, BundleError};
pub use capacity::CapacityReport;
pub use carrier::{Carrier, CarrierAdapter, CarrierKind};
pub use config::{ConfigError, StegConfig};
pub use decoder::{decode, decode_with_config, DecoderConfig};
pub use encoder::{encode, encode_with_config, EncoderConfig};
pub use error::StegoError;
pub use frame::FrameSpec;
