//! Header-field steganography over fabricated packet captures.
//!
//! Each synthetic packet carries exactly one fixed-width chunk of the frame:
//! 2 bytes in the IPv4 identification field of an ICMP echo request, or
//! 4 bytes in the initial sequence number of a TCP SYN. Nothing is sent on
//! the wire; the result is a pcap file.

pub mod packet;
pub mod pcap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use self::packet::Endpoints;
use super::{CarrierAdapter, CarrierKind};
use crate::bits::{push_uint, read_uint};
use crate::config::NetworkConfig;
use crate::error::StegoError;

/// Header field that carries the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PacketField {
    /// IPv4 identification (16 bits), ICMP echo requests.
    #[default]
    IpId,
    /// TCP initial sequence number (32 bits), SYN segments.
    TcpIsn,
}

impl PacketField {
    pub const fn bits(self) -> usize {
        match self {
            PacketField::IpId => 16,
            PacketField::TcpIsn => 32,
        }
    }
}

/// Ordered header-field values of a synthetic capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketStream {
    field: PacketField,
    values: Vec<u32>,
    max_packets: usize,
    endpoints: Endpoints,
}

impl PacketStream {
    /// Empty stream ready to fabricate packets.
    pub fn with_config(config: &NetworkConfig) -> Self {
        Self {
            field: config.field,
            values: Vec::new(),
            max_packets: config.max_packets,
            endpoints: config.endpoints(),
        }
    }

    /// Reads the configured field from every matching packet of a capture,
    /// in capture order.
    pub fn from_pcap_bytes(bytes: &[u8], config: &NetworkConfig) -> Result<Self, StegoError> {
        let capture = pcap::read_capture(bytes)?;

        let mut values = Vec::new();
        let mut skipped = 0usize;
        for data in capture.ip_packets() {
            let Some(parsed) = packet::parse_ipv4(data) else {
                skipped += 1;
                continue;
            };
            match config.field {
                PacketField::IpId => values.push(u32::from(parsed.ip_id)),
                PacketField::TcpIsn => match parsed.tcp {
                    Some(tcp) if tcp.is_syn() => values.push(tcp.seq),
                    _ => skipped += 1,
                },
            }
        }
        if skipped > 0 {
            warn!(skipped, field = ?config.field, "ignored packets without a usable header field");
        }

        Ok(Self {
            values,
            ..Self::with_config(config)
        })
    }

    pub fn field(&self) -> PacketField {
        self.field
    }

    /// Header-field values, one per packet.
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    /// Builds one raw IPv4 packet per value.
    pub fn packets(&self) -> Vec<Vec<u8>> {
        self.values
            .iter()
            .map(|&value| match self.field {
                PacketField::IpId => packet::icmp_echo(value as u16, &self.endpoints),
                PacketField::TcpIsn => packet::tcp_syn(value, &self.endpoints),
            })
            .collect()
    }
}

impl CarrierAdapter for PacketStream {
    fn kind(&self) -> CarrierKind {
        CarrierKind::Network
    }

    fn usable_units(&self) -> usize {
        self.max_packets
    }

    fn bits_per_unit(&self) -> usize {
        self.field.bits()
    }

    /// Replaces the stream with one packet per chunk; the last chunk is
    /// zero-padded.
    fn embed(&self, bits: &[u8]) -> Result<Self, StegoError> {
        let available = self.usable_bits();
        if bits.len() > available {
            return Err(StegoError::too_many_bits(bits.len(), available));
        }

        let width = self.field.bits();
        let values: Vec<u32> = (0..bits.len().div_ceil(width))
            .map(|chunk| read_uint(bits, chunk * width, width))
            .collect();
        debug!(packets = values.len(), field = ?self.field, "fabricated packet stream");

        Ok(Self {
            values,
            ..self.clone()
        })
    }

    fn extract(&self) -> Vec<u8> {
        let width = self.field.bits();
        let mut bits = Vec::with_capacity(self.values.len() * width);
        for &value in &self.values {
            push_uint(&mut bits, value, width);
        }
        bits
    }

    fn to_bytes(&self) -> Result<Vec<u8>, StegoError> {
        Ok(pcap::write_capture(&self.packets()))
    }
}
