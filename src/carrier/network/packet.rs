//! Minimal IPv4 / ICMP / TCP packet fabrication and parsing.
//!
//! Only the fields the network carrier needs are modelled. Built packets are
//! well-formed (correct lengths and checksums) so capture tools display them
//! normally.

use std::net::Ipv4Addr;

pub const PROTO_ICMP: u8 = 1;
pub const PROTO_TCP: u8 = 6;

const IPV4_HEADER_LEN: usize = 20;
const ICMP_ECHO_LEN: usize = 8;
const TCP_HEADER_LEN: usize = 20;
const DEFAULT_TTL: u8 = 64;
const TCP_FLAG_SYN: u8 = 0x02;
const TCP_WINDOW: u16 = 8192;

/// Addresses stamped on every fabricated packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub src_port: u16,
    pub dst_port: u16,
}

/// Header fields read back from a captured packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPacket {
    pub ip_id: u16,
    pub protocol: u8,
    pub tcp: Option<TcpInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpInfo {
    pub seq: u32,
    pub flags: u8,
}

impl TcpInfo {
    /// True for a bare SYN (no ACK, FIN, ...).
    pub fn is_syn(&self) -> bool {
        self.flags == TCP_FLAG_SYN
    }
}

/// ICMP echo request whose IPv4 identification field is `ip_id`.
pub fn icmp_echo(ip_id: u16, endpoints: &Endpoints) -> Vec<u8> {
    let mut icmp = [0u8; ICMP_ECHO_LEN];
    icmp[0] = 8; // echo request
    let checksum = internet_checksum(&icmp);
    icmp[2..4].copy_from_slice(&checksum.to_be_bytes());

    let mut packet = ipv4_header(ip_id, PROTO_ICMP, ICMP_ECHO_LEN, endpoints).to_vec();
    packet.extend_from_slice(&icmp);
    packet
}

/// TCP SYN whose initial sequence number is `seq`.
pub fn tcp_syn(seq: u32, endpoints: &Endpoints) -> Vec<u8> {
    let mut tcp = [0u8; TCP_HEADER_LEN];
    tcp[0..2].copy_from_slice(&endpoints.src_port.to_be_bytes());
    tcp[2..4].copy_from_slice(&endpoints.dst_port.to_be_bytes());
    tcp[4..8].copy_from_slice(&seq.to_be_bytes());
    tcp[12] = ((TCP_HEADER_LEN / 4) as u8) << 4;
    tcp[13] = TCP_FLAG_SYN;
    tcp[14..16].copy_from_slice(&TCP_WINDOW.to_be_bytes());

    let mut pseudo = Vec::with_capacity(12 + TCP_HEADER_LEN);
    pseudo.extend_from_slice(&endpoints.src.octets());
    pseudo.extend_from_slice(&endpoints.dst.octets());
    pseudo.push(0);
    pseudo.push(PROTO_TCP);
    pseudo.extend_from_slice(&(TCP_HEADER_LEN as u16).to_be_bytes());
    pseudo.extend_from_slice(&tcp);
    let checksum = internet_checksum(&pseudo);
    tcp[16..18].copy_from_slice(&checksum.to_be_bytes());

    // Scapy-style default identification for generated SYNs.
    let mut packet = ipv4_header(1, PROTO_TCP, TCP_HEADER_LEN, endpoints).to_vec();
    packet.extend_from_slice(&tcp);
    packet
}

fn ipv4_header(id: u16, protocol: u8, payload_len: usize, endpoints: &Endpoints) -> [u8; IPV4_HEADER_LEN] {
    let mut header = [0u8; IPV4_HEADER_LEN];
    header[0] = 0x45; // version 4, IHL 5
    header[2..4].copy_from_slice(&((IPV4_HEADER_LEN + payload_len) as u16).to_be_bytes());
    header[4..6].copy_from_slice(&id.to_be_bytes());
    header[8] = DEFAULT_TTL;
    header[9] = protocol;
    header[12..16].copy_from_slice(&endpoints.src.octets());
    header[16..20].copy_from_slice(&endpoints.dst.octets());
    let checksum = internet_checksum(&header);
    header[10..12].copy_from_slice(&checksum.to_be_bytes());
    header
}

/// RFC 1071 ones' complement checksum.
pub fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = data
        .chunks(2)
        .map(|pair| u32::from(u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)])))
        .sum();
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// Parses an IPv4 packet (no link-layer header). Returns `None` for anything
/// that is not a plausible IPv4 packet.
pub fn parse_ipv4(data: &[u8]) -> Option<ParsedPacket> {
    if data.len() < IPV4_HEADER_LEN || data[0] >> 4 != 4 {
        return None;
    }
    let header_len = usize::from(data[0] & 0x0F) * 4;
    if header_len < IPV4_HEADER_LEN || data.len() < header_len {
        return None;
    }

    let ip_id = u16::from_be_bytes([data[4], data[5]]);
    let protocol = data[9];
    let segment = &data[header_len..];

    let tcp = (protocol == PROTO_TCP && segment.len() >= 14).then(|| TcpInfo {
        seq: u32::from_be_bytes([segment[4], segment[5], segment[6], segment[7]]),
        flags: segment[13],
    });

    Some(ParsedPacket { ip_id, protocol, tcp })
}
