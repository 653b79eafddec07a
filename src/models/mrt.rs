//! MRT record structs: common header, BGP4MP and TABLE_DUMP_V2 messages.
use crate::models::{Afi, Asn, Attributes, BgpHeader, BgpUpdateMessage, NetworkPrefix};
use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};

/// MRT entry types this crate dispatches on (RFC 6396 section 4).
///
/// `TableDump` is declared for recognition but decoding it is not
/// implemented.
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, TryFromPrimitive)]
#[repr(u16)]
pub enum EntryType {
    TABLE_DUMP = 12,
    TABLE_DUMP_V2 = 13,
    BGP4MP = 16,
    BGP4MP_ET = 17,
}

/// MRT common header (RFC 6396 section 4.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |             Type              |            Subtype            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             Length                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// BGP4MP_ET records carry an extra 4-byte microsecond timestamp between the
/// header and the message; `length` here is always the message length with
/// that field already subtracted.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct CommonHeader {
    pub timestamp: u32,
    pub microsecond_timestamp: Option<u32>,
    pub entry_type: EntryType,
    pub entry_subtype: u16,
    pub length: u32,
}

/// BGP4MP subtypes carrying BGP messages (RFC 6396 section 4.4).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, TryFromPrimitive)]
#[repr(u16)]
pub enum Bgp4MpType {
    Message = 1,
    MessageAs4 = 4,
    MessageAs4Local = 7,
}

/// A BGP4MP message: session header plus the wrapped BGP UPDATE.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct Bgp4MpMessage {
    pub msg_type: Bgp4MpType,
    pub peer_asn: Asn,
    pub local_asn: Asn,
    pub interface_index: u16,
    pub address_family: Afi,
    pub peer_ip: IpAddr,
    pub local_ip: IpAddr,
    pub bgp_header: BgpHeader,
    pub update: BgpUpdateMessage,
}

/// TABLE_DUMP_V2 subtypes (RFC 6396 section 4.3).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, TryFromPrimitive)]
#[repr(u16)]
pub enum TableDumpV2Type {
    PeerIndexTable = 1,
    RibIpv4Unicast = 2,
    RibIpv4Multicast = 3,
    RibIpv6Unicast = 4,
    RibIpv6Multicast = 5,
}

bitflags! {
    /// Peer type octet of a peer-index entry: bit 0 selects IPv6 peer
    /// addresses, bit 1 selects 32-bit peer ASNs.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    #[derive(serde::Serialize)]
    pub struct PeerType: u8 {
        const ADDRESS_FAMILY_IPV6 = 0b0000_0001;
        const AS_SIZE_32BIT       = 0b0000_0010;
    }
}

/// One peer of the peer-index table.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Peer {
    pub peer_type: PeerType,
    pub peer_bgp_id: Ipv4Addr,
    pub peer_ip: IpAddr,
    pub peer_asn: Asn,
}

/// The peer-index table preceding all RIB entries of a TABLE_DUMP_V2 file
/// (RFC 6396 section 4.3.1). Route entries reference peers by position.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct PeerIndexTable {
    pub collector_bgp_id: Ipv4Addr,
    pub view_name: String,
    pub peers: Vec<Peer>,
}

impl PeerIndexTable {
    /// Resolve a route entry's peer index to its peer entry.
    pub fn get_peer(&self, peer_index: u16) -> Option<&Peer> {
        self.peers.get(peer_index as usize)
    }
}

/// One route entry of a RIB subrecord: peer index, origination time, and
/// the entry's path attributes.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct RibEntry {
    pub peer_index: u16,
    pub originated_time: u32,
    pub attributes: Attributes,
}

/// An AFI/SAFI-specific RIB subrecord: one prefix and the entries of every
/// peer carrying a route to it (RFC 6396 section 4.3.2).
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct RibAfiEntries {
    pub rib_type: TableDumpV2Type,
    pub sequence_number: u32,
    pub prefix: NetworkPrefix,
    pub rib_entries: Vec<RibEntry>,
}

/// Decoded TABLE_DUMP_V2 message body.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub enum TableDumpV2Message {
    PeerIndexTable(PeerIndexTable),
    RibAfiEntries(RibAfiEntries),
}

/// Decoded MRT message body, tagged by which decoder chain produced it.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub enum MrtMessage {
    Bgp4Mp(Bgp4MpMessage),
    TableDumpV2(TableDumpV2Message),
}

/// A fully decoded MRT record: the common header plus the layered message
/// stack produced from its payload. Exactly one message variant is
/// populated per record.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct MrtRecord {
    pub common_header: CommonHeader,
    pub message: MrtMessage,
}
