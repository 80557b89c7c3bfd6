//! Error types shared by the codec and every carrier adapter.

use thiserror::Error;

/// Errors that can occur while hiding or recovering a payload.
#[derive(Error, Debug)]
pub enum StegoError {
    /// The framed payload does not fit in the carrier. Nothing was modified.
    #[error("Payload too large: need {needed} bytes, carrier can hold {available}")]
    PayloadTooLarge { needed: usize, available: usize },

    /// No frame marker in the extracted data (no hidden payload, or wrong carrier kind).
    #[error("No hidden data found in carrier")]
    FrameNotFound,

    /// A marker was found but the frame runs past the end of the extracted data.
    #[error("Hidden data is truncated: frame declares {declared} bytes, only {available} available")]
    FrameTruncated { declared: u64, available: usize },

    /// A marker was found but the data ends inside the length field itself.
    #[error("Hidden data is truncated: frame length field is missing {missing} bytes")]
    FrameHeaderTruncated { missing: usize },

    /// Authentication failed. Deliberately does not say whether the password
    /// or the data was at fault.
    #[error("Decryption failed: wrong password or corrupted data")]
    DecryptionFailed,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// The carrier container cannot hold LSB data (lossy format, float samples, ...).
    #[error("Unsupported carrier format: {0}")]
    UnsupportedCarrierFormat(String),

    #[error("Carrier load error: {0}")]
    CarrierLoad(String),

    #[error("Carrier save error: {0}")]
    CarrierSave(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StegoError {
    /// Builds a [`StegoError::PayloadTooLarge`] from bit counts, rounding the
    /// requirement up and the availability down to whole bytes.
    pub(crate) fn too_many_bits(needed_bits: usize, available_bits: usize) -> Self {
        Self::PayloadTooLarge {
            needed: needed_bits.div_ceil(8),
            available: available_bits / 8,
        }
    }
}
