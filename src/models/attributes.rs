//! BGP path attribute structs
use crate::models::{AsPath, Asn};
use bitflags::bitflags;
use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::net::IpAddr;

bitflags! {
    /// Attribute flags octet, numbered from the MSB per RFC 4271:
    /// optional (bit 0), transitive (bit 1), partial (bit 2),
    /// extended-length (bit 3).
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    #[derive(serde::Serialize)]
    pub struct AttrFlags: u8 {
        const OPTIONAL   = 0b10000000;
        const TRANSITIVE = 0b01000000;
        const PARTIAL    = 0b00100000;
        const EXTENDED   = 0b00010000;
    }
}

/// Attribute type codes recognized by the decoder.
///
/// Codes without a dedicated parser are still recorded in the presence list
/// with their payload skipped. Full registry:
/// <https://www.iana.org/assignments/bgp-parameters/bgp-parameters.xhtml#bgp-parameters-2>
#[allow(non_camel_case_types)]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive, IntoPrimitive, Serialize)]
#[repr(u8)]
pub enum AttrType {
    ORIGIN = 1,
    AS_PATH = 2,
    NEXT_HOP = 3,
    MULTI_EXIT_DISCRIMINATOR = 4,
    LOCAL_PREFERENCE = 5,
    ATOMIC_AGGREGATE = 6,
    AGGREGATOR = 7,
    COMMUNITIES = 8,
    ORIGINATOR_ID = 9,
    CLUSTER_LIST = 10,
    MP_REACHABLE_NLRI = 14,
    MP_UNREACHABLE_NLRI = 15,
    EXTENDED_COMMUNITIES = 16,
    AS4_PATH = 17,
    AS4_AGGREGATOR = 18,
    PMSI_TUNNEL = 22,
    TUNNEL_ENCAPSULATION = 23,
    TRAFFIC_ENGINEERING = 24,
    IPV6_ADDRESS_SPECIFIC_EXTENDED_COMMUNITIES = 25,
    AIGP = 26,
    PE_DISTINGUISHER_LABELS = 27,
    BGP_LS_ATTRIBUTE = 29,
    LARGE_COMMUNITIES = 32,
    BGPSEC_PATH = 33,
    ATTR_SET = 128,

    /// Catch all for any unknown attribute types.
    #[num_enum(catch_all)]
    Unknown(u8) = 0,
}

/// ORIGIN attribute value.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, TryFromPrimitive, IntoPrimitive, Serialize)]
#[repr(u8)]
pub enum Origin {
    Igp = 0,
    Egp = 1,
    Incomplete = 2,
}

impl Display for Origin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Origin::Igp => "IGP",
            Origin::Egp => "EGP",
            Origin::Incomplete => "INCOMPLETE",
        };
        write!(f, "{}", s)
    }
}

/// A community value: either a regular 4-byte community or an opaque
/// 8-byte extended community tuple.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum Community {
    Regular { asn: u16, value: u16 },
    Extended([u8; 8]),
}

impl Display for Community {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Community::Regular { asn, value } => write!(f, "{}:{}", asn, value),
            Community::Extended(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// AGGREGATOR attribute: the aggregating AS and its router address.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct Aggregator {
    pub asn: Asn,
    pub ip: IpAddr,
}

/// One entry of the attribute presence list: the type code and the flags
/// octet it arrived with. Every attribute seen is recorded here, including
/// ones whose payload is skipped.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct AttrMeta {
    pub attr_type: AttrType,
    pub flags: AttrFlags,
}

/// Aggregate of the decoded path attributes of one update or RIB entry.
///
/// AS_PATH and AS4_PATH segments accumulate into `as_path`; COMMUNITY and
/// EXTENDED_COMMUNITY values accumulate into `communities`. All other codes
/// appear at most once and the last occurrence wins.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize)]
pub struct Attributes {
    pub origin: Option<Origin>,
    pub as_path: AsPath,
    pub next_hop: Option<IpAddr>,
    pub multi_exit: Option<u32>,
    pub local_pref: Option<u32>,
    pub atomic_aggregate: bool,
    pub aggregator: Option<Aggregator>,
    pub communities: Vec<Community>,
    /// Type code and flags of every attribute encountered, in wire order.
    pub seen: Vec<AttrMeta>,
}

impl Attributes {
    pub fn has_attr(&self, attr_type: AttrType) -> bool {
        self.seen.iter().any(|meta| meta.attr_type == attr_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_type_from_u8() {
        assert_eq!(AttrType::from(1), AttrType::ORIGIN);
        assert_eq!(AttrType::from(14), AttrType::MP_REACHABLE_NLRI);
        assert_eq!(AttrType::from(128), AttrType::ATTR_SET);
        assert_eq!(AttrType::from(99), AttrType::Unknown(99));
    }

    #[test]
    fn test_attr_flags_numbering() {
        // RFC 4271 numbering measured from the MSB
        assert_eq!(AttrFlags::OPTIONAL.bits(), 0x80);
        assert_eq!(AttrFlags::TRANSITIVE.bits(), 0x40);
        assert_eq!(AttrFlags::PARTIAL.bits(), 0x20);
        assert_eq!(AttrFlags::EXTENDED.bits(), 0x10);
    }

    #[test]
    fn test_community_display() {
        let c = Community::Regular {
            asn: 3356,
            value: 2,
        };
        assert_eq!(c.to_string(), "3356:2");

        let e = Community::Extended([0, 2, 0xd, 0x1c, 0, 0, 0, 0x64]);
        assert_eq!(e.to_string(), "00020d1c00000064");
    }
}
