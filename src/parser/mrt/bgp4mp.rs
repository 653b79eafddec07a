/*!
BGP4MP message decoding.

RFC: <https://www.rfc-editor.org/rfc/rfc6396#section-4.4>
*/
use crate::error::ParserError;
use crate::models::*;
use crate::parser::bgp::parse_bgp_message;
use crate::parser::ReadUtils;

/*
   0                   1                   2                   3
   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |         Peer AS Number        |        Local AS Number        |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |        Interface Index        |        Address Family         |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                      Peer IP Address (variable)               |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                      Local IP Address (variable)              |
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
  |                    BGP Message... (variable)
  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

  The AS4 subtypes widen both AS number fields to 32 bits.
*/

/// Parse a BGP4MP message: the session header selects the ASN width and
/// address family, the tail is a BGP message.
pub fn parse_bgp4mp(subtype: u16, data: &[u8]) -> Result<Bgp4MpMessage, ParserError> {
    let msg_type = Bgp4MpType::try_from(subtype).map_err(|_| ParserError::UnsupportedSubtype {
        entry_type: "BGP4MP",
        subtype,
    })?;

    let asn_len = match msg_type {
        Bgp4MpType::Message => AsnLength::Bits16,
        Bgp4MpType::MessageAs4 | Bgp4MpType::MessageAs4Local => AsnLength::Bits32,
    };

    let mut data = data;
    let peer_asn = data.read_asn(asn_len)?;
    let local_asn = data.read_asn(asn_len)?;
    let interface_index = data.read_u16()?;
    let address_family = data.read_afi()?;
    let peer_ip = data.read_address(&address_family)?;
    let local_ip = data.read_address(&address_family)?;

    let (bgp_header, update) = parse_bgp_message(
        data,
        asn_len,
        address_family == Afi::Ipv6,
    )?;

    Ok(Bgp4MpMessage {
        msg_type,
        peer_asn,
        local_asn,
        interface_index,
        address_family,
        peer_ip,
        local_ip,
        bgp_header,
        update,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;
    use std::str::FromStr;

    /// Assemble a minimal BGP4MP AS4 message wrapping an UPDATE that
    /// announces 192.0.2.0/24.
    fn bgp4mp_as4_v4_message() -> Vec<u8> {
        let mut data = vec![
            0, 0, 0xfd, 0xe8, // peer ASN: 65000
            0, 0, 0xfd, 0xe9, // local ASN: 65001
            0, 1, // interface index
            0, 1, // address family: IPv4
            10, 0, 0, 1, // peer IP
            10, 0, 0, 2, // local IP
        ];
        // BGP header
        data.extend_from_slice(&[0xff; 16]);
        data.extend_from_slice(&[0, 27]); // length: 19 header + 8 body
        data.push(2); // type: UPDATE
        // UPDATE body
        data.extend_from_slice(&[
            0, 0, // withdrawn routes length
            0, 0, // total path attribute length
            24, 192, 0, 2, // NLRI: 192.0.2.0/24
        ]);
        data
    }

    #[test]
    fn test_parse_bgp4mp_message_as4() {
        let data = bgp4mp_as4_v4_message();
        let msg = parse_bgp4mp(4, &data).unwrap();

        assert_eq!(msg.msg_type, Bgp4MpType::MessageAs4);
        assert_eq!(msg.peer_asn, 65000u32);
        assert_eq!(msg.local_asn, 65001u32);
        assert_eq!(msg.address_family, Afi::Ipv4);
        assert_eq!(msg.peer_ip, IpAddr::from_str("10.0.0.1").unwrap());
        assert_eq!(msg.local_ip, IpAddr::from_str("10.0.0.2").unwrap());
        assert_eq!(msg.bgp_header.msg_type, BgpMessageType::Update);
        assert_eq!(
            msg.update.announced_prefixes,
            vec![NetworkPrefix::from_str("192.0.2.0/24").unwrap()]
        );
    }

    #[test]
    fn test_parse_bgp4mp_two_byte_asn() {
        let mut data = vec![
            0xfd, 0xe8, // peer ASN: 65000
            0xfd, 0xe9, // local ASN: 65001
            0, 1, // interface index
            0, 1, // address family: IPv4
            10, 0, 0, 1, // peer IP
            10, 0, 0, 2, // local IP
        ];
        data.extend_from_slice(&[0xff; 16]);
        data.extend_from_slice(&[0, 23]);
        data.push(2);
        data.extend_from_slice(&[0, 0, 0, 0]);

        let msg = parse_bgp4mp(1, &data).unwrap();
        assert_eq!(msg.msg_type, Bgp4MpType::Message);
        assert_eq!(msg.peer_asn, 65000u32);
        assert!(msg.update.announced_prefixes.is_empty());
        assert!(msg.update.withdrawn_prefixes.is_empty());
    }

    #[test]
    fn test_unsupported_subtype() {
        assert!(matches!(
            parse_bgp4mp(0, &[]),
            Err(ParserError::UnsupportedSubtype { subtype: 0, .. })
        ));
    }

    #[test]
    fn test_unsupported_address_family() {
        let data = [
            0, 0, 0xfd, 0xe8, // peer ASN
            0, 0, 0xfd, 0xe9, // local ASN
            0, 1, // interface index
            0, 9, // bogus address family
        ];
        assert!(matches!(
            parse_bgp4mp(4, &data),
            Err(ParserError::UnsupportedAfi(9))
        ));
    }
}
