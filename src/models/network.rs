//! Network-level types: address families, AS numbers, IP prefixes.
use crate::ParserError;
use ipnet::IpNet;
use num_enum::TryFromPrimitive;
use serde::{Serialize, Serializer};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;

/// AFI -- Address Family Identifier
///
/// <https://www.iana.org/assignments/address-family-numbers/address-family-numbers.xhtml>
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, TryFromPrimitive)]
#[repr(u16)]
pub enum Afi {
    Ipv4 = 1,
    Ipv6 = 2,
}

/// AS number length: 16 or 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize)]
pub enum AsnLength {
    Bits16,
    Bits32,
}

/// ASN -- Autonomous System Number
#[derive(Clone, Copy, Eq, Ord, PartialOrd, Serialize)]
#[serde(into = "u32")]
pub struct Asn {
    pub asn: u32,
    pub len: AsnLength,
}

impl Asn {
    /// Constructs a new 2-octet `Asn`.
    pub const fn new_16bit(asn: u16) -> Self {
        Asn {
            asn: asn as u32,
            len: AsnLength::Bits16,
        }
    }

    /// Constructs a new 4-octet `Asn`.
    pub const fn new_32bit(asn: u32) -> Self {
        Asn {
            asn,
            len: AsnLength::Bits32,
        }
    }

    pub const fn is_four_byte(&self) -> bool {
        matches!(self.len, AsnLength::Bits32)
    }
}

impl PartialEq for Asn {
    fn eq(&self, other: &Self) -> bool {
        self.asn == other.asn
    }
}

impl PartialEq<u32> for Asn {
    fn eq(&self, other: &u32) -> bool {
        self.asn == *other
    }
}

impl Hash for Asn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.asn.hash(state);
    }
}

impl From<Asn> for u32 {
    fn from(value: Asn) -> Self {
        value.asn
    }
}

impl Debug for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.asn)
    }
}

impl Display for Asn {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.asn)
    }
}

/// An IP prefix as it appears on the wire: address plus mask length.
///
/// Trailing bits past the mask are cleared at parse time; the wire is not
/// required to clear them.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub struct NetworkPrefix {
    pub prefix: IpNet,
}

impl NetworkPrefix {
    pub fn new(prefix: IpNet) -> NetworkPrefix {
        NetworkPrefix { prefix }
    }
}

impl Deref for NetworkPrefix {
    type Target = IpNet;

    fn deref(&self) -> &Self::Target {
        &self.prefix
    }
}

impl Debug for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

impl Display for NetworkPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix)
    }
}

impl Serialize for NetworkPrefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl FromStr for NetworkPrefix {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let prefix = IpNet::from_str(s)?;
        Ok(NetworkPrefix { prefix })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asn_equality_ignores_length() {
        assert_eq!(Asn::new_16bit(65000), Asn::new_32bit(65000));
        assert_eq!(Asn::new_32bit(65000), 65000u32);
    }

    #[test]
    fn test_prefix_from_str() {
        let prefix = NetworkPrefix::from_str("10.0.0.0/8").unwrap();
        assert_eq!(prefix.to_string(), "10.0.0.0/8");
        assert_eq!(prefix.prefix_len(), 8);

        assert!(NetworkPrefix::from_str("not-a-prefix").is_err());
    }
}
