/*!
BGP message header and UPDATE body decoding.

RFC: <https://tools.ietf.org/html/rfc4271#section-4.3>
*/
use crate::error::ParserError;
use crate::models::*;
use crate::parser::bgp::attributes::parse_attributes;
use crate::parser::utils::parse_prefix_list;
use crate::parser::ReadUtils;

/// BGP message header length: 16-byte marker + 2-byte length + 1-byte type.
pub const BGP_HEADER_LEN: usize = 19;

/// Parse the BGP message header and the UPDATE body that follows it.
///
/// The marker is carried as-is; RFC 4271 requires all-ones but archived
/// sessions do not always comply. Message types other than UPDATE are not
/// captured in the archives this crate targets and are rejected.
pub fn parse_bgp_message(
    mut data: &[u8],
    asn_len: AsnLength,
    is_v6: bool,
) -> Result<(BgpHeader, BgpUpdateMessage), ParserError> {
    data.require_n_remaining(BGP_HEADER_LEN, "BGP message header")?;

    let mut marker = [0u8; 16];
    data.read_exact(&mut marker)?;
    let length = data.read_u16()?;
    let type_value = data.read_u8()?;
    let msg_type = BgpMessageType::try_from(type_value)
        .map_err(|_| ParserError::ParseError(format!("invalid BGP message type: {type_value}")))?;

    if msg_type != BgpMessageType::Update {
        return Err(ParserError::Unsupported(format!(
            "unsupported BGP message type: {:?}",
            msg_type
        )));
    }

    let header = BgpHeader {
        marker,
        length,
        msg_type,
    };
    let update = parse_bgp_update(data, asn_len, is_v6)?;
    Ok((header, update))
}

/*
  UPDATE body layout:
  +-----------------------------------------------------+
  |   Withdrawn Routes Length (2 octets)                |
  +-----------------------------------------------------+
  |   Withdrawn Routes (variable)                       |
  +-----------------------------------------------------+
  |   Total Path Attribute Length (2 octets)            |
  +-----------------------------------------------------+
  |   Path Attributes (variable)                        |
  +-----------------------------------------------------+
  |   Network Layer Reachability Information (variable) |
  +-----------------------------------------------------+
*/

/// Parse a BGP UPDATE body.
///
/// Prefixes advertised or withdrawn through the multiprotocol attributes
/// merge with the plain blocks, MP prefixes first. An update may carry only
/// withdrawals, only announcements, or both.
pub fn parse_bgp_update(
    mut input: &[u8],
    asn_len: AsnLength,
    is_v6: bool,
) -> Result<BgpUpdateMessage, ParserError> {
    let withdrawn_length = input.read_u16()? as usize;
    let withdrawn_bytes = input.split_to(withdrawn_length)?;
    let plain_withdrawn = parse_prefix_list(withdrawn_bytes, is_v6);

    let attr_length = input.read_u16()? as usize;
    let attr_bytes = input.split_to(attr_length)?;
    let parsed = parse_attributes(attr_bytes, asn_len, is_v6);

    // the remaining bytes are the NLRI block:
    // total - 4 - attr_length - withdrawn_length
    let plain_announced = parse_prefix_list(input, is_v6);

    let mut withdrawn_prefixes = parsed.mp_withdrawn;
    withdrawn_prefixes.extend(plain_withdrawn);
    let mut announced_prefixes = parsed.mp_announced;
    announced_prefixes.extend(plain_announced);

    Ok(BgpUpdateMessage {
        withdrawn_prefixes,
        attributes: parsed.attributes,
        announced_prefixes,
        attr_error: parsed.error,
    })
}
