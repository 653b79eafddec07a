//! MRT outer decoder: common header parsing and per-type dispatch.
mod bgp4mp;
mod table_dump_v2;

pub use bgp4mp::parse_bgp4mp;
pub use table_dump_v2::parse_table_dump_v2;

use crate::error::ParserError;
use crate::models::*;
use crate::parser::scan::MRT_HEADER_LEN;
use crate::parser::ReadUtils;

/// Parse the 12-byte MRT common header off the front of `data`.
///
/// For BGP4MP_ET records the on-wire length includes the 4-byte microsecond
/// timestamp that follows the header; internally `length` is the message
/// length only, so the field is validated and subtracted here.
pub fn parse_common_header(data: &mut &[u8]) -> Result<CommonHeader, ParserError> {
    data.require_n_remaining(MRT_HEADER_LEN, "MRT common header")?;

    let timestamp = data.read_u32()?;
    let type_value = data.read_u16()?;
    let entry_type =
        EntryType::try_from(type_value).map_err(|_| ParserError::UnsupportedType(type_value))?;
    let entry_subtype = data.read_u16()?;
    let mut length = data.read_u32()?;

    let microsecond_timestamp = match entry_type {
        EntryType::BGP4MP_ET => {
            if length < 4 {
                return Err(ParserError::ParseError(
                    "invalid MRT header length for ET record: length < 4".to_string(),
                ));
            }
            length -= 4;
            Some(data.read_u32()?)
        }
        _ => None,
    };

    Ok(CommonHeader {
        timestamp,
        microsecond_timestamp,
        entry_type,
        entry_subtype,
        length,
    })
}

/// Parse one framed MRT record: common header, then the type-specific
/// message stack over the declared payload.
pub fn parse_mrt_record(token: &[u8]) -> Result<MrtRecord, ParserError> {
    let mut data = token;
    let common_header = parse_common_header(&mut data)?;

    let payload = data.split_to(common_header.length as usize)?;
    let message = parse_mrt_body(&common_header, payload)?;

    Ok(MrtRecord {
        common_header,
        message,
    })
}

/// Dispatch the record payload to the decoder selected by the header's
/// entry type and subtype.
pub fn parse_mrt_body(
    header: &CommonHeader,
    payload: &[u8],
) -> Result<MrtMessage, ParserError> {
    match header.entry_type {
        EntryType::BGP4MP | EntryType::BGP4MP_ET => {
            Ok(MrtMessage::Bgp4Mp(parse_bgp4mp(header.entry_subtype, payload)?))
        }
        EntryType::TABLE_DUMP_V2 => Ok(MrtMessage::TableDumpV2(parse_table_dump_v2(
            header.entry_subtype,
            payload,
        )?)),
        EntryType::TABLE_DUMP => Err(ParserError::Unsupported(
            "TABLE_DUMP (type 12) not implemented".to_string(),
        )),
    }
}
