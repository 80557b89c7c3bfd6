//! LSB steganography for audio files.
//!
//! Hides data in the least significant bits of audio samples.
//! Supports WAV files with 8- or 16-bit integer PCM; every interleaved
//! sample carries one bit, in file order.

use std::io::{Cursor, Read, Seek};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use super::{CarrierAdapter, CarrierKind};
use crate::error::StegoError;

/// Audio steganography carrier.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCarrier {
    /// Audio specification (sample rate, channels, etc.)
    spec: WavSpec,
    /// Interleaved samples, widened to i32 regardless of sample width.
    samples: Vec<i32>,
}

impl AudioCarrier {
    /// Creates a new AudioCarrier from WAV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        let reader = WavReader::new(Cursor::new(bytes))
            .map_err(|e| StegoError::CarrierLoad(e.to_string()))?;

        Self::from_reader(reader)
    }

    fn from_reader<R: Read + Seek>(reader: WavReader<R>) -> Result<Self, StegoError> {
        let spec = reader.spec();
        let samples = reader
            .into_samples::<i32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StegoError::CarrierLoad(e.to_string()))?;

        Self::from_samples(spec, samples)
    }

    /// Builds a carrier from raw interleaved samples.
    pub fn from_samples(spec: WavSpec, samples: Vec<i32>) -> Result<Self, StegoError> {
        if spec.sample_format != SampleFormat::Int || !matches!(spec.bits_per_sample, 8 | 16) {
            return Err(StegoError::UnsupportedCarrierFormat(format!(
                "only 8- or 16-bit PCM WAV is supported, got {} bits {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }

        Ok(Self { spec, samples })
    }

    /// Returns the audio specification.
    pub fn spec(&self) -> &WavSpec {
        &self.spec
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Returns the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / self.spec.channels.max(1) as usize;
        frames as f64 / self.spec.sample_rate as f64
    }
}

impl CarrierAdapter for AudioCarrier {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Audio
    }

    fn usable_units(&self) -> usize {
        self.samples.len()
    }

    fn embed(&self, bits: &[u8]) -> Result<Self, StegoError> {
        if bits.len() > self.samples.len() {
            return Err(StegoError::too_many_bits(bits.len(), self.samples.len()));
        }

        let mut samples = self.samples.clone();
        for (sample, &bit) in samples.iter_mut().zip(bits) {
            *sample = (*sample & !1) | i32::from(bit & 1);
        }

        debug!(bits = bits.len(), samples = samples.len(), "embedded bits into audio");
        Ok(Self {
            spec: self.spec,
            samples,
        })
    }

    fn extract(&self) -> Vec<u8> {
        self.samples.iter().map(|s| (s & 1) as u8).collect()
    }

    /// Returns the audio as uncompressed WAV bytes with the original spec.
    fn to_bytes(&self) -> Result<Vec<u8>, StegoError> {
        let mut bytes = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), self.spec)
                .map_err(|e| StegoError::CarrierSave(e.to_string()))?;

            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| StegoError::CarrierSave(e.to_string()))?;
            }

            writer
                .finalize()
                .map_err(|e| StegoError::CarrierSave(e.to_string()))?;
        }
        Ok(bytes)
    }
}

#[cfg(test)]
pub(crate) fn create_test_audio(sample_count: usize, bits_per_sample: u16) -> AudioCarrier {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };
    let amplitude = if bits_per_sample == 8 { 100.0 } else { 16000.0 };

    // A4 sine
    let samples = (0..sample_count)
        .map(|i| {
            let t = i as f64 / 44100.0;
            (f64::sin(2.0 * std::f64::consts::PI * 440.0 * t) * amplitude) as i32
        })
        .collect();

    AudioCarrier { spec, samples }
}
