//! Byte ⇄ bit conversion used by every carrier adapter.
//!
//! Bits are represented as `u8` values that are always `0` or `1`, most
//! significant bit first within each byte.

/// Expands `bytes` into bits, MSB first, bytes in input order.
pub fn to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in 0..8 {
            bits.push((byte >> (7 - i)) & 1);
        }
    }
    bits
}

/// Packs bits back into bytes, eight at a time.
///
/// A trailing group shorter than eight bits is dropped, not zero-padded.
pub fn from_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks_exact(8)
        .map(|group| group.iter().fold(0u8, |acc, &bit| (acc << 1) | (bit & 1)))
        .collect()
}

/// Reads `width` bits (MSB first) starting at `offset` as an unsigned value.
/// Missing bits past the end of `bits` read as zero.
pub(crate) fn read_uint(bits: &[u8], offset: usize, width: usize) -> u32 {
    (0..width).fold(0u32, |acc, i| {
        let bit = bits.get(offset + i).copied().unwrap_or(0) & 1;
        (acc << 1) | u32::from(bit)
    })
}

/// Appends the low `width` bits of `value` to `bits`, MSB first.
pub(crate) fn push_uint(bits: &mut Vec<u8>, value: u32, width: usize) {
    for i in (0..width).rev() {
        bits.push(((value >> i) & 1) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first() {
        assert_eq!(to_bits(&[0xA3]), vec![1, 0, 1, 0, 0, 0, 1, 1]);
        assert_eq!(to_bits(&[0x01, 0x80]), vec![0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_roundtrip_all_byte_values() {
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(from_bits(&to_bits(&data)), data);
    }

    #[test]
    fn test_empty() {
        assert!(to_bits(&[]).is_empty());
        assert!(from_bits(&[]).is_empty());
    }

    #[test]
    fn test_trailing_partial_group_dropped() {
        let mut bits = to_bits(b"ok");
        bits.extend_from_slice(&[1, 1, 1]);
        assert_eq!(from_bits(&bits), b"ok");
    }

    #[test]
    fn test_uint_helpers() {
        let mut bits = Vec::new();
        push_uint(&mut bits, 0b101, 3);
        push_uint(&mut bits, 0xBEEF, 16);
        assert_eq!(read_uint(&bits, 0, 3), 0b101);
        assert_eq!(read_uint(&bits, 3, 16), 0xBEEF);
        // Reading past the end pads with zeros.
        assert_eq!(read_uint(&[1], 0, 2), 0b10);
    }
}
