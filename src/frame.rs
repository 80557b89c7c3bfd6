//! Self-delimiting payload frame.
//!
//! Every carrier embeds the same structure:
//!
//! ```text
//! [12 bytes ] marker, unique per carrier kind
//! [4|8 bytes] body length, big-endian, width fixed per carrier family
//! [N bytes  ] body (the optionally encrypted payload)
//! ```
//!
//! Raster and PCM carriers use a 64-bit length, symbol carriers (text, emoji,
//! packet fields) a 32-bit one. The length always counts the body only.

use crate::error::StegoError;

/// Width of the big-endian length field that follows the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthWidth {
    U32,
    U64,
}

impl LengthWidth {
    /// Size of the field in bytes.
    pub const fn bytes(self) -> usize {
        match self {
            LengthWidth::U32 => 4,
            LengthWidth::U64 => 8,
        }
    }

    /// Largest body length the field can express.
    pub const fn max_len(self) -> u64 {
        match self {
            LengthWidth::U32 => u32::MAX as u64,
            LengthWidth::U64 => u64::MAX,
        }
    }
}

/// Frame layout for one carrier kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    pub marker: &'static [u8],
    pub length_width: LengthWidth,
}

pub const IMAGE_FRAME: FrameSpec = FrameSpec {
    marker: b"<<stg:img>>\0",
    length_width: LengthWidth::U64,
};

pub const AUDIO_FRAME: FrameSpec = FrameSpec {
    marker: b"<<stg:wav>>\0",
    length_width: LengthWidth::U64,
};

pub const TEXT_FRAME: FrameSpec = FrameSpec {
    marker: b"<<stg:txt>>\0",
    length_width: LengthWidth::U32,
};

pub const EMOJI_FRAME: FrameSpec = FrameSpec {
    marker: b"<<stg:emj>>\0",
    length_width: LengthWidth::U32,
};

pub const NETWORK_FRAME: FrameSpec = FrameSpec {
    marker: b"<<stg:net>>\0",
    length_width: LengthWidth::U32,
};

impl FrameSpec {
    /// Marker plus length field.
    pub const fn header_len(&self) -> usize {
        self.marker.len() + self.length_width.bytes()
    }

    /// Total framed size of a body of `body_len` bytes.
    pub const fn frame_len(&self, body_len: usize) -> usize {
        self.header_len() + body_len
    }

    /// Wraps `body` as `marker ++ length ++ body`.
    pub fn wrap(&self, body: &[u8]) -> Result<Vec<u8>, StegoError> {
        let max = self.length_width.max_len();
        if body.len() as u64 > max {
            return Err(StegoError::PayloadTooLarge {
                needed: body.len(),
                available: usize::try_from(max).unwrap_or(usize::MAX),
            });
        }

        let mut frame = Vec::with_capacity(self.frame_len(body.len()));
        frame.extend_from_slice(self.marker);
        match self.length_width {
            LengthWidth::U32 => frame.extend_from_slice(&(body.len() as u32).to_be_bytes()),
            LengthWidth::U64 => frame.extend_from_slice(&(body.len() as u64).to_be_bytes()),
        }
        frame.extend_from_slice(body);
        Ok(frame)
    }

    /// Locates the first frame in `buffer` and returns exactly its body.
    ///
    /// Bytes after the body (decoder over-read) are ignored.
    pub fn unwrap<'a>(&self, buffer: &'a [u8]) -> Result<&'a [u8], StegoError> {
        let start = find_marker(buffer, self.marker).ok_or(StegoError::FrameNotFound)?;
        let len_start = start + self.marker.len();
        let body_start = len_start + self.length_width.bytes();

        if buffer.len() < body_start {
            return Err(StegoError::FrameHeaderTruncated {
                missing: body_start - buffer.len(),
            });
        }

        let field = &buffer[len_start..body_start];
        let declared = field.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        let available = buffer.len() - body_start;

        match usize::try_from(declared) {
            Ok(len) if len <= available => Ok(&buffer[body_start..body_start + len]),
            _ => Err(StegoError::FrameTruncated { declared, available }),
        }
    }
}

/// Raw byte containment search; bodies are arbitrary binary.
fn find_marker(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
