//! Capacity arithmetic shared by all carriers.
//!
//! A carrier exposes `usable_bits`; the payload capacity is what remains of
//! those bits, in whole bytes, after the frame header.

use serde::Serialize;
use tracing::debug;

use crate::crypto::ENVELOPE_OVERHEAD;
use crate::error::StegoError;
use crate::frame::FrameSpec;

/// Maximum payload bytes for a carrier with `usable_bits` bits of room.
pub fn capacity_bytes(usable_bits: usize, frame: &FrameSpec) -> usize {
    (usable_bits / 8).saturating_sub(frame.header_len())
}

/// Fails with [`StegoError::PayloadTooLarge`] if a body of `body_len` bytes
/// cannot be framed into `usable_bits`.
pub fn check_fits(body_len: usize, usable_bits: usize, frame: &FrameSpec) -> Result<(), StegoError> {
    let available = capacity_bytes(usable_bits, frame);
    debug!(body_len, available, usable_bits, "capacity check");

    if body_len > available {
        return Err(StegoError::PayloadTooLarge {
            needed: body_len,
            available,
        });
    }
    Ok(())
}

/// Human/JSON friendly capacity summary for one carrier instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityReport {
    pub kind: String,
    pub usable_units: usize,
    pub bits_per_unit: usize,
    pub usable_bits: usize,
    pub header_overhead: usize,
    /// Payload bytes without a password.
    pub capacity_bytes: usize,
    /// Payload bytes when a password is used (envelope overhead removed).
    pub encrypted_capacity_bytes: usize,
}

impl CapacityReport {
    pub fn new(kind: &str, usable_units: usize, bits_per_unit: usize, frame: &FrameSpec) -> Self {
        let usable_bits = usable_units.saturating_mul(bits_per_unit);
        let capacity = capacity_bytes(usable_bits, frame);
        Self {
            kind: kind.to_string(),
            usable_units,
            bits_per_unit,
            usable_bits,
            header_overhead: frame.header_len(),
            capacity_bytes: capacity,
            encrypted_capacity_bytes: capacity.saturating_sub(ENVELOPE_OVERHEAD),
        }
    }
}
