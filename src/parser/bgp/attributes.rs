/*!
BGP path attribute decoding.

The attribute block of an update (or of a RIB entry) is a flat sequence of
`{flags, type, length, payload}` tuples; the length field widens to two
bytes when the extended-length flag (0x10) is set. The decoder walks the
block, slices each attribute's payload off with the cursor, and dispatches
on the type code.

MP_REACH_NLRI and MP_UNREACH_NLRI carry advertised/withdrawn prefixes
inside the attribute block; those are side-returned on [ParsedAttributes]
so the update decoder can merge them with the plain NLRI blocks.
*/
use crate::error::ParserError;
use crate::models::*;
use crate::parser::utils::parse_prefix_list;
use crate::parser::ReadUtils;
use log::warn;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const AS_PATH_AS_SET: u8 = 1;
const AS_PATH_AS_SEQUENCE: u8 = 2;

/// Result of decoding one attribute block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedAttributes {
    pub attributes: Attributes,
    /// Prefixes advertised through MP_REACH_NLRI.
    pub mp_announced: Vec<NetworkPrefix>,
    /// Prefixes withdrawn through MP_UNREACH_NLRI.
    pub mp_withdrawn: Vec<NetworkPrefix>,
    /// Set when the block aborted mid-way; everything decoded before the
    /// fault is retained above.
    pub error: Option<String>,
}

fn malformed(code: u8, reason: impl ToString) -> ParserError {
    ParserError::MalformedAttribute {
        code,
        reason: reason.to_string(),
    }
}

/// Decode an attribute block.
///
/// `asn_len` is the AS number width negotiated by the enclosing session
/// (TABLE_DUMP_V2 is always 32-bit); `is_v6` selects address widths for
/// NEXT_HOP and NLRI prefixes.
///
/// The loop ends cleanly when the block is exhausted; a partial attribute
/// header at the tail returns what has been decoded so far. An attribute
/// whose declared length runs past the end of the block, or whose payload
/// violates its code's contract, aborts the block with the fault recorded
/// on [ParsedAttributes::error].
pub fn parse_attributes(mut data: &[u8], asn_len: AsnLength, is_v6: bool) -> ParsedAttributes {
    let mut parsed = ParsedAttributes::default();
    // a next hop copied from MP_REACH_NLRI wins over attribute 3
    let mut mp_next_hop = false;

    while data.remaining() >= 3 {
        let flags = AttrFlags::from_bits_retain(match data.read_u8() {
            Ok(v) => v,
            Err(_) => break,
        });
        let type_value = match data.read_u8() {
            Ok(v) => v,
            Err(_) => break,
        };
        let attr_length = if flags.contains(AttrFlags::EXTENDED) {
            match data.read_u16() {
                Ok(v) => v as usize,
                Err(_) => break,
            }
        } else {
            match data.read_u8() {
                Ok(v) => v as usize,
                Err(_) => break,
            }
        };

        if attr_length > data.remaining() {
            let e = malformed(
                type_value,
                format!(
                    "declared length {} exceeds {} bytes left in block",
                    attr_length,
                    data.remaining()
                ),
            );
            warn!("{}", e);
            parsed.error = Some(e.to_string());
            break;
        }

        let attr_type = AttrType::from(type_value);
        parsed.attributes.seen.push(AttrMeta { attr_type, flags });

        let attr_data = match data.split_to(attr_length) {
            Ok(v) => v,
            Err(_) => break,
        };

        let result = match attr_type {
            AttrType::ORIGIN => parse_origin(attr_data, &mut parsed.attributes),
            AttrType::AS_PATH => {
                parse_as_path_segments(attr_data, asn_len, &mut parsed.attributes.as_path)
            }
            AttrType::NEXT_HOP => {
                parse_next_hop(attr_data, is_v6, mp_next_hop, &mut parsed.attributes)
            }
            AttrType::MULTI_EXIT_DISCRIMINATOR => {
                parse_u32_attr(attr_data, 4).map(|v| parsed.attributes.multi_exit = Some(v))
            }
            AttrType::LOCAL_PREFERENCE => {
                parse_u32_attr(attr_data, 5).map(|v| parsed.attributes.local_pref = Some(v))
            }
            AttrType::ATOMIC_AGGREGATE => {
                parsed.attributes.atomic_aggregate = true;
                Ok(())
            }
            AttrType::AGGREGATOR => parse_aggregator(attr_data, &mut parsed.attributes),
            AttrType::COMMUNITIES => {
                parse_regular_communities(attr_data, &mut parsed.attributes.communities)
            }
            AttrType::EXTENDED_COMMUNITIES => {
                parse_extended_communities(attr_data, &mut parsed.attributes.communities)
            }
            AttrType::MP_REACHABLE_NLRI => parse_mp_reach(
                attr_data,
                is_v6,
                &mut parsed.attributes,
                &mut mp_next_hop,
                &mut parsed.mp_announced,
            ),
            AttrType::MP_UNREACHABLE_NLRI => {
                parse_mp_unreach(attr_data, is_v6, &mut parsed.mp_withdrawn)
            }
            AttrType::AS4_PATH => parse_as_path_segments(
                attr_data,
                AsnLength::Bits32,
                &mut parsed.attributes.as_path,
            ),
            // recorded in the presence list above; payload not inspected
            _ => Ok(()),
        };

        if let Err(e) = result {
            warn!("{}", e);
            parsed.error = Some(e.to_string());
            break;
        }
    }

    parsed
}

fn parse_origin(mut data: &[u8], attributes: &mut Attributes) -> Result<(), ParserError> {
    if data.remaining() != 1 {
        return Err(malformed(
            1,
            format!("ORIGIN should be 1 byte long and it is {}", data.remaining()),
        ));
    }
    let value = data.read_u8()?;
    attributes.origin =
        Some(Origin::try_from(value).map_err(|_| malformed(1, format!("bad ORIGIN {value}")))?);
    Ok(())
}

/// Parse the segments of one AS_PATH (or AS4_PATH) attribute, appending
/// them to the path accumulated so far.
fn parse_as_path_segments(
    mut data: &[u8],
    asn_len: AsnLength,
    as_path: &mut AsPath,
) -> Result<(), ParserError> {
    while data.remaining() > 0 {
        let segment_type = data.read_u8()?;
        let count = data.read_u8()? as usize;
        let asns = data.read_asns(asn_len, count)?;
        match segment_type {
            AS_PATH_AS_SET => as_path.append_segment(AsPathSegment::AsSet(asns)),
            AS_PATH_AS_SEQUENCE => as_path.append_segment(AsPathSegment::AsSequence(asns)),
            _ => {
                return Err(malformed(
                    2,
                    format!("invalid AS path segment type: {segment_type}"),
                ))
            }
        }
    }
    Ok(())
}

fn parse_next_hop(
    mut data: &[u8],
    is_v6: bool,
    mp_next_hop: bool,
    attributes: &mut Attributes,
) -> Result<(), ParserError> {
    let next_hop = match (is_v6, data.remaining()) {
        (false, 4) => IpAddr::V4(data.read_ipv4_address()?),
        (true, 16) => IpAddr::V6(data.read_ipv6_address()?),
        (v6, n) => {
            return Err(malformed(
                3,
                format!("NEXT_HOP of {n} bytes in an {} session", if v6 { "IPv6" } else { "IPv4" }),
            ))
        }
    };
    if !mp_next_hop {
        attributes.next_hop = Some(next_hop);
    }
    Ok(())
}

fn parse_u32_attr(mut data: &[u8], code: u8) -> Result<u32, ParserError> {
    if data.remaining() != 4 {
        return Err(malformed(
            code,
            format!("expected exactly 4 bytes, got {}", data.remaining()),
        ));
    }
    data.read_u32()
}

/// AGGREGATOR accepts four wire sizes: {2,4}-byte ASN times {4,16}-byte
/// address.
fn parse_aggregator(mut data: &[u8], attributes: &mut Attributes) -> Result<(), ParserError> {
    let (asn, ip) = match data.remaining() {
        6 => {
            let asn = data.read_asn(AsnLength::Bits16)?;
            (asn, IpAddr::V4(data.read_ipv4_address()?))
        }
        8 => {
            let asn = data.read_asn(AsnLength::Bits32)?;
            (asn, IpAddr::V4(data.read_ipv4_address()?))
        }
        18 => {
            let asn = data.read_asn(AsnLength::Bits16)?;
            (asn, IpAddr::V6(data.read_ipv6_address()?))
        }
        20 => {
            let asn = data.read_asn(AsnLength::Bits32)?;
            (asn, IpAddr::V6(data.read_ipv6_address()?))
        }
        n => {
            return Err(malformed(
                7,
                format!("AGGREGATOR of {n} bytes, accepted lengths are 6, 8, 18 and 20"),
            ))
        }
    };
    attributes.aggregator = Some(Aggregator { asn, ip });
    Ok(())
}

/// Each 4-byte group is `{u16 asn : u16 value}`; multiple COMMUNITY
/// attributes concatenate.
fn parse_regular_communities(
    mut data: &[u8],
    communities: &mut Vec<Community>,
) -> Result<(), ParserError> {
    if data.remaining() % 4 != 0 {
        return Err(malformed(
            8,
            format!("COMMUNITY length {} is not a multiple of 4", data.remaining()),
        ));
    }
    while data.remaining() > 0 {
        let asn = data.read_u16()?;
        let value = data.read_u16()?;
        communities.push(Community::Regular { asn, value });
    }
    Ok(())
}

fn parse_extended_communities(
    mut data: &[u8],
    communities: &mut Vec<Community>,
) -> Result<(), ParserError> {
    if data.remaining() % 8 != 0 {
        return Err(malformed(
            16,
            format!(
                "EXTENDED_COMMUNITY length {} is not a multiple of 8",
                data.remaining()
            ),
        ));
    }
    while data.remaining() > 0 {
        let mut tuple = [0u8; 8];
        data.read_exact(&mut tuple)?;
        communities.push(Community::Extended(tuple));
    }
    Ok(())
}

/*
   MP_REACH_NLRI (RFC 4760 section 3):
   +---------------------------------------------------------+
   | Address Family Identifier (2 octets)                    |
   +---------------------------------------------------------+
   | Subsequent Address Family Identifier (1 octet)          |
   +---------------------------------------------------------+
   | Length of Next Hop Network Address (1 octet)            |
   +---------------------------------------------------------+
   | Network Address of Next Hop (variable)                  |
   +---------------------------------------------------------+
   | Number of SNPAs (1 octet, zero since RFC 4760)          |
   +---------------------------------------------------------+
   | Network Layer Reachability Information (variable)       |
   +---------------------------------------------------------+
*/
fn parse_mp_reach(
    mut data: &[u8],
    is_v6: bool,
    attributes: &mut Attributes,
    mp_next_hop: &mut bool,
    mp_announced: &mut Vec<NetworkPrefix>,
) -> Result<(), ParserError> {
    data.require_n_remaining(4, "MP_REACH_NLRI header")?;
    let _afi = data.read_u16()?;
    let _safi = data.read_u8()?;
    let next_hop_len = data.read_u8()? as usize;

    let next_hop_bytes = data
        .split_to(next_hop_len)
        .map_err(|_| malformed(14, "next hop length in MP_REACH runs past the attribute"))?;
    let next_hop = match (is_v6, next_hop_len) {
        (false, 4) => {
            let bytes: [u8; 4] = next_hop_bytes.try_into().unwrap();
            IpAddr::V4(Ipv4Addr::from(bytes))
        }
        (true, 16) => {
            let bytes: [u8; 16] = next_hop_bytes.try_into().unwrap();
            IpAddr::V6(Ipv6Addr::from(bytes))
        }
        // a 32-byte next hop carries global followed by link-local; keep
        // the global address (RFC 2545)
        (true, 32) => {
            let bytes: [u8; 16] = next_hop_bytes[..16].try_into().unwrap();
            IpAddr::V6(Ipv6Addr::from(bytes))
        }
        (v6, n) => {
            return Err(malformed(
                14,
                format!(
                    "MP_REACH next hop of {n} bytes in an {} session",
                    if v6 { "IPv6" } else { "IPv4" }
                ),
            ))
        }
    };
    // this next hop is preferred over attribute 3 if both exist
    attributes.next_hop = Some(next_hop);
    *mp_next_hop = true;

    // SNPAs are deprecated; skip over them
    let snpa_count = data.read_u8()?;
    for _ in 0..snpa_count {
        let snpa_len = data.read_u8()? as usize;
        data.advance(snpa_len)
            .map_err(|_| malformed(14, "SNPA length runs past the attribute"))?;
    }

    mp_announced.extend(parse_prefix_list(data, is_v6));
    Ok(())
}

/// MP_UNREACH_NLRI: AFI (2 octets), SAFI (1 octet), withdrawn routes.
fn parse_mp_unreach(
    mut data: &[u8],
    is_v6: bool,
    mp_withdrawn: &mut Vec<NetworkPrefix>,
) -> Result<(), ParserError> {
    data.require_n_remaining(3, "MP_UNREACH_NLRI header")?;
    data.advance(3)?;
    mp_withdrawn.extend(parse_prefix_list(data, is_v6));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_origin() {
        let data: &[u8] = &[
            0x40, 1, 1, // flags, ORIGIN, length 1
            0, // IGP
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.error.is_none());
        assert_eq!(parsed.attributes.origin, Some(Origin::Igp));
        assert_eq!(
            parsed.attributes.seen,
            vec![AttrMeta {
                attr_type: AttrType::ORIGIN,
                flags: AttrFlags::TRANSITIVE,
            }]
        );
    }

    #[test]
    fn test_parse_as_path_16bit() {
        let data: &[u8] = &[
            0x40, 2, 8, // flags, AS_PATH, length 8
            2, // AS_SEQUENCE
            3, // 3 ASes in path
            0, 1, // AS1
            0, 2, // AS2
            0, 3, // AS3
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert_eq!(parsed.attributes.as_path.collapsed(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_as_path_32bit_multiple_segments() {
        let data: &[u8] = &[
            0x40, 2, 16, // flags, AS_PATH, length 16
            2, // AS_SEQUENCE
            2, // 2 ASes
            0, 0, 0, 1, // AS1
            0, 0, 0, 2, // AS2
            1, // AS_SET
            1, // 1 AS
            0, 0, 0, 3, // AS3
            0x40, 1, 1, 2, // ORIGIN: INCOMPLETE
        ];
        let parsed = parse_attributes(data, AsnLength::Bits32, false);
        assert!(parsed.error.is_none());
        assert_eq!(parsed.attributes.as_path.collapsed(), vec![1, 2, 3]);
        assert_eq!(parsed.attributes.origin, Some(Origin::Incomplete));
    }

    #[test]
    fn test_as4_path_accumulates() {
        let data: &[u8] = &[
            0x40, 2, 4, // AS_PATH, 16-bit session
            2, 1, 0, 10, // sequence [10]
            0xc0, 17, 6, // AS4_PATH, always 32-bit
            2, 1, 0, 3, 0x0d, 0x1c, // sequence [199964]
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert_eq!(parsed.attributes.as_path.collapsed(), vec![10, 199964]);
    }

    #[test]
    fn test_invalid_segment_type_aborts_block() {
        let data: &[u8] = &[
            0x40, 2, 4, // flags, AS_PATH, length 4
            5, 1, 0, 1, // segment type 5 does not exist
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.error.is_some());
        assert!(parsed.attributes.as_path.is_empty());
    }

    #[test]
    fn test_parse_next_hop_and_med() {
        let data: &[u8] = &[
            0x40, 3, 4, 192, 0, 2, 1, // NEXT_HOP 192.0.2.1
            0x80, 4, 4, 0, 0, 0, 50, // MED 50
            0x40, 5, 4, 0, 0, 0, 100, // LOCAL_PREF 100
            0x40, 6, 0, // ATOMIC_AGGREGATE
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.error.is_none());
        assert_eq!(
            parsed.attributes.next_hop,
            Some(IpAddr::from_str("192.0.2.1").unwrap())
        );
        assert_eq!(parsed.attributes.multi_exit, Some(50));
        assert_eq!(parsed.attributes.local_pref, Some(100));
        assert!(parsed.attributes.atomic_aggregate);
    }

    #[test]
    fn test_next_hop_family_mismatch() {
        let data: &[u8] = &[0x40, 3, 4, 192, 0, 2, 1];
        let parsed = parse_attributes(data, AsnLength::Bits16, true);
        assert!(parsed.error.is_some());
        assert!(parsed.attributes.next_hop.is_none());
    }

    #[test]
    fn test_parse_aggregator_lengths() {
        // 2-byte ASN + IPv4
        let data: &[u8] = &[0xc0, 7, 6, 0xfd, 0xe8, 10, 0, 0, 1];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        let aggregator = parsed.attributes.aggregator.unwrap();
        assert_eq!(aggregator.asn, 65000u32);
        assert_eq!(aggregator.ip, IpAddr::from_str("10.0.0.1").unwrap());

        // 4-byte ASN + IPv4
        let data: &[u8] = &[0xc0, 7, 8, 0, 3, 0x0d, 0x1c, 10, 0, 0, 1];
        let parsed = parse_attributes(data, AsnLength::Bits32, false);
        assert_eq!(parsed.attributes.aggregator.unwrap().asn, 199964u32);

        // bogus length
        let data: &[u8] = &[0xc0, 7, 5, 1, 2, 3, 4, 5];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.error.is_some());
    }

    #[test]
    fn test_parse_communities_concatenate() {
        let data: &[u8] = &[
            0xc0, 8, 4, 0x0d, 0x1c, 0, 1, // 3356:1
            0xc0, 8, 4, 0x0d, 0x1c, 0, 2, // second COMMUNITY attribute
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert_eq!(
            parsed.attributes.communities,
            vec![
                Community::Regular { asn: 3356, value: 1 },
                Community::Regular { asn: 3356, value: 2 },
            ]
        );
    }

    #[test]
    fn test_parse_extended_communities() {
        let data: &[u8] = &[
            0xc0, 16, 8, // flags, EXTENDED_COMMUNITIES, length 8
            0, 2, 0x0d, 0x1c, 0, 0, 0, 0x64,
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert_eq!(
            parsed.attributes.communities,
            vec![Community::Extended([0, 2, 0x0d, 0x1c, 0, 0, 0, 0x64])]
        );
    }

    /// MP_REACH_NLRI with an IPv6 next hop and one IPv6 NLRI prefix.
    #[test]
    fn test_parse_mp_reach_v6() {
        let data: &[u8] = &[
            0x80, 14, 26, // flags, MP_REACH_NLRI, length 26
            0, 2, // AFI: IPv6
            1, // SAFI: unicast
            16, // next hop length
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, // 2001:db8::1
            0, // SNPA count
            32, 0x20, 0x01, 0x0d, 0xb8, // NLRI: 2001:db8::/32
        ];
        let parsed = parse_attributes(data, AsnLength::Bits32, true);
        assert!(parsed.error.is_none());
        assert_eq!(
            parsed.attributes.next_hop,
            Some(IpAddr::from_str("2001:db8::1").unwrap())
        );
        assert_eq!(
            parsed.mp_announced,
            vec![NetworkPrefix::from_str("2001:db8::/32").unwrap()]
        );
    }

    /// A 32-byte next hop carries global + link-local; the global half wins.
    #[test]
    fn test_parse_mp_reach_v6_link_local_next_hop() {
        let mut data = vec![
            0x80, 14, 42, // flags, MP_REACH_NLRI, length 42
            0, 2, 1,  // AFI, SAFI
            32, // next hop length
        ];
        data.extend_from_slice(&[
            0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
        ]);
        data.extend_from_slice(&[
            0xfe, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
        ]);
        data.push(0); // SNPA count
        data.extend_from_slice(&[32, 0x20, 0x01, 0x0d, 0xb8]);

        let parsed = parse_attributes(&data, AsnLength::Bits32, true);
        assert_eq!(
            parsed.attributes.next_hop,
            Some(IpAddr::from_str("2001:db8::1").unwrap())
        );
    }

    #[test]
    fn test_mp_reach_next_hop_preferred_over_attr3() {
        let mut data = vec![
            0x80, 14, 9, // MP_REACH_NLRI, length 9
            0, 1, 1, // AFI: IPv4, SAFI
            4, 10, 0, 0, 9, // next hop 10.0.0.9
            0, // SNPA count
        ];
        // plain NEXT_HOP arriving after MP_REACH must not override
        data.extend_from_slice(&[0x40, 3, 4, 192, 0, 2, 1]);

        let parsed = parse_attributes(&data, AsnLength::Bits16, false);
        assert_eq!(
            parsed.attributes.next_hop,
            Some(IpAddr::from_str("10.0.0.9").unwrap())
        );
    }

    #[test]
    fn test_parse_mp_unreach() {
        let data: &[u8] = &[
            0x80, 15, 7, // flags, MP_UNREACH_NLRI, length 7
            0, 2, // AFI: IPv6
            1, // SAFI
            24, 0x20, 0x01, 0x0d, // withdrawn 2001:d00::/24
        ];
        let parsed = parse_attributes(data, AsnLength::Bits32, true);
        assert_eq!(
            parsed.mp_withdrawn,
            vec![NetworkPrefix::from_str("2001:d00::/24").unwrap()]
        );
    }

    #[test]
    fn test_unknown_attribute_skipped() {
        let data: &[u8] = &[
            0xc0, 99, 2, 0xaa, 0xbb, // unknown code 99, skipped
            0x40, 1, 1, 0, // ORIGIN still decoded
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.error.is_none());
        assert_eq!(parsed.attributes.origin, Some(Origin::Igp));
        assert!(parsed.attributes.has_attr(AttrType::Unknown(99)));
    }

    #[test]
    fn test_skipped_known_codes_recorded() {
        let data: &[u8] = &[
            0xc0, 32, 12, // LARGE_COMMUNITIES, skipped
            0, 0, 0x0d, 0x1c, 0, 0, 0, 1, 0, 0, 0, 2,
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.attributes.has_attr(AttrType::LARGE_COMMUNITIES));
    }

    #[test]
    fn test_overflowing_length_retains_partial() {
        let data: &[u8] = &[
            0x40, 1, 1, 0, // ORIGIN: IGP
            0x40, 2, 40, 2, 1, 0, 1, // AS_PATH declaring 40 bytes with 4 left
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.error.is_some());
        assert_eq!(parsed.attributes.origin, Some(Origin::Igp));
    }

    #[test]
    fn test_extended_length_attribute() {
        let data: &[u8] = &[
            0x50, 2, 0, 8, // extended-length AS_PATH, u16 length
            2, 3, 0, 1, 0, 2, 0, 3,
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        assert!(parsed.error.is_none());
        assert_eq!(parsed.attributes.as_path.collapsed(), vec![1, 2, 3]);
    }

    #[test]
    fn test_partial_header_at_tail() {
        let data: &[u8] = &[
            0x40, 1, 1, 0, // ORIGIN: IGP
            0x40, 2, // partial header, no length byte
        ];
        let parsed = parse_attributes(data, AsnLength::Bits16, false);
        // two trailing bytes are below the 3-byte header minimum
        assert!(parsed.error.is_none());
        assert_eq!(parsed.attributes.origin, Some(Origin::Igp));
    }
}
