/*!
TABLE_DUMP_V2 decoding: the peer-index table and AFI/SAFI-specific RIB
entry subrecords.

RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.3>
*/
use crate::error::ParserError;
use crate::models::*;
use crate::parser::bgp::parse_attributes;
use crate::parser::ReadUtils;
use log::warn;
use std::net::Ipv4Addr;

/// Dispatch a TABLE_DUMP_V2 payload on its subtype: the peer-index table or
/// a per-prefix RIB entry list.
pub fn parse_table_dump_v2(
    subtype: u16,
    data: &[u8],
) -> Result<TableDumpV2Message, ParserError> {
    let rib_type =
        TableDumpV2Type::try_from(subtype).map_err(|_| ParserError::UnsupportedSubtype {
            entry_type: "TABLE_DUMP_V2",
            subtype,
        })?;

    match rib_type {
        TableDumpV2Type::PeerIndexTable => Ok(TableDumpV2Message::PeerIndexTable(
            parse_peer_index_table(data)?,
        )),
        _ => Ok(TableDumpV2Message::RibAfiEntries(parse_rib_afi_entries(
            data, rib_type,
        )?)),
    }
}

/// Peer index table
///
/// RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.3.1>
pub fn parse_peer_index_table(mut data: &[u8]) -> Result<PeerIndexTable, ParserError> {
    let collector_bgp_id = Ipv4Addr::from(data.read_u32()?);
    let view_name_length = data.read_u16()?;
    let view_name = data.read_n_bytes_to_string(view_name_length as usize)?;

    let peer_count = data.read_u16()?;
    let mut peers = Vec::with_capacity(peer_count as usize);
    for _ in 0..peer_count {
        let peer_type = PeerType::from_bits_retain(data.read_u8()?);
        let afi = match peer_type.contains(PeerType::ADDRESS_FAMILY_IPV6) {
            true => Afi::Ipv6,
            false => Afi::Ipv4,
        };
        let asn_len = match peer_type.contains(PeerType::AS_SIZE_32BIT) {
            true => AsnLength::Bits32,
            false => AsnLength::Bits16,
        };

        let peer_bgp_id = Ipv4Addr::from(data.read_u32()?);
        let peer_ip = data.read_address(&afi)?;
        let peer_asn = data.read_asn(asn_len)?;
        peers.push(Peer {
            peer_type,
            peer_bgp_id,
            peer_ip,
            peer_asn,
        });
    }

    Ok(PeerIndexTable {
        collector_bgp_id,
        view_name,
        peers,
    })
}

/// RIB AFI-specific entries: one prefix followed by the route entries of
/// every peer carrying it.
///
/// ```text
///         0                   1                   2                   3
///         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |                         Sequence Number                       |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        | Prefix Length |
///        +-+-+-+-+-+-+-+-+
///        |                        Prefix (variable)                      |
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///        |         Entry Count           |  RIB Entries (variable)
///        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
pub fn parse_rib_afi_entries(
    mut data: &[u8],
    rib_type: TableDumpV2Type,
) -> Result<RibAfiEntries, ParserError> {
    let is_v6 = matches!(
        rib_type,
        TableDumpV2Type::RibIpv6Unicast | TableDumpV2Type::RibIpv6Multicast
    );

    let sequence_number = data.read_u32()?;
    let prefix = read_rib_prefix(&mut data, is_v6)?;

    let entry_count = data.read_u16()?;
    let mut rib_entries = Vec::with_capacity(entry_count as usize);

    for _ in 0..entry_count {
        let entry = match parse_rib_entry(&mut data, is_v6) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("early break parsing RIB entries: {}", e);
                break;
            }
        };
        rib_entries.push(entry);
    }

    Ok(RibAfiEntries {
        rib_type,
        sequence_number,
        prefix,
        rib_entries,
    })
}

/// Read the single length-prefixed prefix at the head of a RIB subrecord,
/// consuming exactly its wire bytes. A /0 prefix carries no address bytes.
fn read_rib_prefix(data: &mut &[u8], is_v6: bool) -> Result<NetworkPrefix, ParserError> {
    let bit_len = data.read_u8()?;
    let max_bits: u8 = if is_v6 { 128 } else { 32 };
    if bit_len > max_bits {
        return Err(ParserError::ParseError(format!(
            "prefix bit length {} out of range",
            bit_len
        )));
    }
    let byte_len = (bit_len as usize + 7) / 8;
    let prefix_bytes = data.split_to(byte_len)?;

    let prefix = match is_v6 {
        false => {
            let mut buff = [0u8; 4];
            buff[..byte_len].copy_from_slice(prefix_bytes);
            match ipnet::Ipv4Net::new(std::net::Ipv4Addr::from(buff), bit_len) {
                Ok(net) => ipnet::IpNet::V4(net.trunc()),
                Err(_) => unreachable!("bit length has already been checked"),
            }
        }
        true => {
            let mut buff = [0u8; 16];
            buff[..byte_len].copy_from_slice(prefix_bytes);
            match ipnet::Ipv6Net::new(std::net::Ipv6Addr::from(buff), bit_len) {
                Ok(net) => ipnet::IpNet::V6(net.trunc()),
                Err(_) => unreachable!("bit length has already been checked"),
            }
        }
    };
    Ok(NetworkPrefix::new(prefix))
}

/*
        0                   1                   2                   3
        0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
       |         Peer Index            |
       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
       |                         Originated Time                       |
       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
       |      Attribute Length         |
       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
       |                    BGP Attributes... (variable)
       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
*/
fn parse_rib_entry(data: &mut &[u8], is_v6: bool) -> Result<RibEntry, ParserError> {
    data.require_n_remaining(8, "RIB entry header")?;
    let peer_index = data.read_u16()?;
    let originated_time = data.read_u32()?;
    let attribute_length = data.read_u16()? as usize;

    let attr_data = data.split_to(attribute_length)?;
    // TABLE_DUMP_V2 always encodes 4-byte ASNs
    let parsed = parse_attributes(attr_data, AsnLength::Bits32, is_v6);

    Ok(RibEntry {
        peer_index,
        originated_time,
        attributes: parsed.attributes,
    })
}
