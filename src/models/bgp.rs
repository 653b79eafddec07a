//! BGP message structs.
use crate::models::{Attributes, NetworkPrefix};
use num_enum::TryFromPrimitive;
use serde::Serialize;

/// BGP message type octet.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, TryFromPrimitive)]
#[repr(u8)]
pub enum BgpMessageType {
    Open = 1,
    Update = 2,
    Notification = 3,
    Keepalive = 4,
}

/// BGP message header.
///
/// The 16-byte marker is all-ones per RFC 4271 but is carried as-is and not
/// validated; real archives contain non-conforming markers.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct BgpHeader {
    pub marker: [u8; 16],
    pub length: u16,
    pub msg_type: BgpMessageType,
}

/// A decoded BGP UPDATE message.
///
/// Prefixes advertised through MP_REACH_NLRI come first in
/// `announced_prefixes`, followed by the prefixes of the trailing NLRI
/// block; likewise MP_UNREACH_NLRI prefixes precede the plain withdrawn
/// block in `withdrawn_prefixes`. Either list may be empty.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct BgpUpdateMessage {
    pub withdrawn_prefixes: Vec<NetworkPrefix>,
    pub attributes: Attributes,
    pub announced_prefixes: Vec<NetworkPrefix>,
    /// Set when the attribute block aborted mid-way; the attributes decoded
    /// before the fault are retained above.
    pub attr_error: Option<String>,
}
