//! Classic libpcap capture file reading and writing.
//!
//! Written files use the little-endian microsecond format, version 2.4 and
//! `LINKTYPE_RAW` (bare IPv4 packets). Reading also accepts big-endian and
//! nanosecond captures and Ethernet link layers.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use crate::error::StegoError;

pub const LINKTYPE_ETHERNET: u32 = 1;
pub const LINKTYPE_RAW: u32 = 101;

const MAGIC_MICROS: u32 = 0xA1B2_C3D4;
const MAGIC_NANOS: u32 = 0xA1B2_3C4D;
const GLOBAL_HEADER_LEN: usize = 24;
const RECORD_HEADER_LEN: usize = 16;
const SNAPLEN: u32 = 65_535;
const ETHERTYPE_IPV4: u16 = 0x0800;
const ETHERNET_HEADER_LEN: usize = 14;

/// Spacing between fabricated packets.
const PACKET_SPACING_MICROS: u64 = 1_000;

/// One captured packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcapRecord {
    pub ts_sec: u32,
    /// Microseconds or nanoseconds depending on the file magic.
    pub ts_frac: u32,
    pub data: Vec<u8>,
}

/// A parsed capture file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub linktype: u32,
    pub records: Vec<PcapRecord>,
}

impl Capture {
    /// Network-layer payloads (IPv4 packets) in capture order.
    ///
    /// Ethernet frames that do not carry IPv4 are skipped.
    pub fn ip_packets(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let linktype = self.linktype;
        self.records.iter().filter_map(move |record| match linktype {
            LINKTYPE_RAW => Some(record.data.as_slice()),
            LINKTYPE_ETHERNET => {
                let data = &record.data;
                if data.len() < ETHERNET_HEADER_LEN {
                    return None;
                }
                let ethertype = u16::from_be_bytes([data[12], data[13]]);
                (ethertype == ETHERTYPE_IPV4).then(|| &data[ETHERNET_HEADER_LEN..])
            }
            _ => None,
        })
    }
}

/// Serializes raw IPv4 packets into a capture file.
pub fn write_capture(packets: &[Vec<u8>]) -> Vec<u8> {
    let total: usize = packets.iter().map(|p| RECORD_HEADER_LEN + p.len()).sum();
    let mut out = Vec::with_capacity(GLOBAL_HEADER_LEN + total);

    out.extend_from_slice(&MAGIC_MICROS.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes()); // thiszone
    out.extend_from_slice(&0u32.to_le_bytes()); // sigfigs
    out.extend_from_slice(&SNAPLEN.to_le_bytes());
    out.extend_from_slice(&LINKTYPE_RAW.to_le_bytes());

    let start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0);

    for (i, packet) in packets.iter().enumerate() {
        let ts = start + i as u64 * PACKET_SPACING_MICROS;
        let len = packet.len() as u32;
        out.extend_from_slice(&((ts / 1_000_000) as u32).to_le_bytes());
        out.extend_from_slice(&((ts % 1_000_000) as u32).to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(packet);
    }
    out
}

/// Parses a capture file. A truncated trailing record is dropped with a warning.
pub fn read_capture(bytes: &[u8]) -> Result<Capture, StegoError> {
    if bytes.len() < GLOBAL_HEADER_LEN {
        return Err(StegoError::CarrierLoad("capture shorter than pcap header".to_string()));
    }

    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    let little_endian = if [MAGIC_MICROS, MAGIC_NANOS].contains(&u32::from_le_bytes(magic)) {
        true
    } else if [MAGIC_MICROS, MAGIC_NANOS].contains(&u32::from_be_bytes(magic)) {
        false
    } else {
        return Err(StegoError::UnsupportedCarrierFormat(
            "not a libpcap capture (pcapng is not supported)".to_string(),
        ));
    };
    let read_u32 = |at: usize| {
        let field = [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
        if little_endian {
            u32::from_le_bytes(field)
        } else {
            u32::from_be_bytes(field)
        }
    };

    let linktype = read_u32(20);
    if linktype != LINKTYPE_RAW && linktype != LINKTYPE_ETHERNET {
        return Err(StegoError::UnsupportedCarrierFormat(format!(
            "unsupported pcap link type {}",
            linktype
        )));
    }

    let mut records = Vec::new();
    let mut offset = GLOBAL_HEADER_LEN;
    while offset < bytes.len() {
        if bytes.len() - offset < RECORD_HEADER_LEN {
            warn!(offset, "truncated pcap record header, ignoring rest of capture");
            break;
        }
        let ts_sec = read_u32(offset);
        let ts_frac = read_u32(offset + 4);
        let incl_len = read_u32(offset + 8) as usize;
        let data_start = offset + RECORD_HEADER_LEN;

        if bytes.len() - data_start < incl_len {
            warn!(offset, incl_len, "truncated pcap record, ignoring rest of capture");
            break;
        }

        records.push(PcapRecord {
            ts_sec,
            ts_frac,
            data: bytes[data_start..data_start + incl_len].to_vec(),
        });
        offset = data_start + incl_len;
    }

    Ok(Capture { linktype, records })
}
