/*!
Bounded byte-cursor utilities shared by all decoders.

Every decoder routes its reads through [ReadUtils]; there is no ad-hoc
indexing into record buffers. A read past the end of the current slice
fails with [ParserError::ShortBuffer] carrying the shortfall.
*/
use crate::error::ParserError;
use crate::models::*;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use log::warn;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

#[cold]
fn eof(name: &'static str, expected: usize, found: usize) -> ParserError {
    ParserError::ShortBuffer {
        name,
        expected,
        found,
    }
}

impl ReadUtils for &'_ [u8] {
    #[inline]
    fn remaining(&self) -> usize {
        self.len()
    }

    #[inline]
    fn advance(&mut self, x: usize) -> Result<(), ParserError> {
        if self.len() >= x {
            *self = &self[x..];
            return Ok(());
        }

        Err(eof("advance", x, self.len()))
    }

    #[inline]
    fn split_to(&mut self, n: usize) -> Result<Self, ParserError> {
        if self.len() >= n {
            let (a, b) = self.split_at(n);
            *self = b;
            return Ok(a);
        }

        Err(eof("split_to", n, self.len()))
    }

    #[inline(always)]
    fn read_u8(&mut self) -> Result<u8, ParserError> {
        if !self.is_empty() {
            let value = self[0];
            *self = &self[1..];
            return Ok(value);
        }

        Err(eof("read_u8", 1, 0))
    }

    #[inline(always)]
    fn read_u16(&mut self) -> Result<u16, ParserError> {
        if self.len() >= 2 {
            let (bytes, remaining) = self.split_at(2);
            *self = remaining;
            return Ok(u16::from_be_bytes(bytes.try_into().unwrap()));
        }

        Err(eof("read_u16", 2, self.len()))
    }

    #[inline(always)]
    fn read_u32(&mut self) -> Result<u32, ParserError> {
        if self.len() >= 4 {
            let (bytes, remaining) = self.split_at(4);
            *self = remaining;
            return Ok(u32::from_be_bytes(bytes.try_into().unwrap()));
        }

        Err(eof("read_u32", 4, self.len()))
    }

    #[inline(always)]
    fn read_u64(&mut self) -> Result<u64, ParserError> {
        if self.len() >= 8 {
            let (bytes, remaining) = self.split_at(8);
            *self = remaining;
            return Ok(u64::from_be_bytes(bytes.try_into().unwrap()));
        }

        Err(eof("read_u64", 8, self.len()))
    }

    #[inline]
    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), ParserError> {
        if self.len() >= buffer.len() {
            let (bytes, remaining) = self.split_at(buffer.len());
            buffer.copy_from_slice(bytes);
            *self = remaining;
            return Ok(());
        }

        Err(eof("read_exact", buffer.len(), self.len()))
    }
}

pub trait ReadUtils: Sized {
    fn remaining(&self) -> usize;
    fn advance(&mut self, x: usize) -> Result<(), ParserError>;
    fn split_to(&mut self, n: usize) -> Result<Self, ParserError>;
    fn read_u8(&mut self) -> Result<u8, ParserError>;
    fn read_u16(&mut self) -> Result<u16, ParserError>;
    fn read_u32(&mut self) -> Result<u32, ParserError>;
    fn read_u64(&mut self) -> Result<u64, ParserError>;
    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), ParserError>;

    /// Check that the buffer has at least n bytes remaining. This can help
    /// the compiler optimize away bounds checks.
    #[inline(always)]
    fn require_n_remaining(&self, n: usize, target: &'static str) -> Result<(), ParserError> {
        if self.remaining() >= n {
            return Ok(());
        }

        Err(eof(target, n, self.remaining()))
    }

    fn read_address(&mut self, afi: &Afi) -> Result<IpAddr, ParserError> {
        match afi {
            Afi::Ipv4 => self.read_ipv4_address().map(IpAddr::V4),
            Afi::Ipv6 => self.read_ipv6_address().map(IpAddr::V6),
        }
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        self.require_n_remaining(4, "IPv4 address")?;
        let addr = self.read_u32()?;
        Ok(Ipv4Addr::from(addr))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.require_n_remaining(16, "IPv6 address")?;
        let mut buffer = [0; 16];
        self.read_exact(&mut buffer)?;
        Ok(Ipv6Addr::from(buffer))
    }

    #[inline]
    fn read_asn(&mut self, as_length: AsnLength) -> Result<Asn, ParserError> {
        match as_length {
            AsnLength::Bits16 => self.read_u16().map(Asn::new_16bit),
            AsnLength::Bits32 => self.read_u32().map(Asn::new_32bit),
        }
    }

    fn read_asns(&mut self, as_length: AsnLength, count: usize) -> Result<Vec<Asn>, ParserError> {
        let mut path = Vec::with_capacity(count);

        match as_length {
            AsnLength::Bits16 => {
                self.require_n_remaining(count * 2, "16bit ASNs")?;
                for _ in 0..count {
                    path.push(Asn::new_16bit(self.read_u16()?));
                }
            }
            AsnLength::Bits32 => {
                self.require_n_remaining(count * 4, "32bit ASNs")?;
                for _ in 0..count {
                    path.push(Asn::new_32bit(self.read_u32()?));
                }
            }
        }

        Ok(path)
    }

    #[inline(always)]
    fn read_afi(&mut self) -> Result<Afi, ParserError> {
        let value = self.read_u16()?;
        Afi::try_from(value).map_err(|_| ParserError::UnsupportedAfi(value))
    }

    fn read_n_bytes(&mut self, n_bytes: usize) -> Result<Vec<u8>, ParserError> {
        self.require_n_remaining(n_bytes, "raw bytes")?;
        let mut buffer = vec![0; n_bytes];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    fn read_n_bytes_to_string(&mut self, n_bytes: usize) -> Result<String, ParserError> {
        let buffer = self.read_n_bytes(n_bytes)?;
        Ok(buffer.into_iter().map(|x: u8| x as char).collect::<String>())
    }
}

/// Read a packed list of NLRI prefixes: repeatedly a bit-length octet
/// followed by `ceil(bitlen/8)` address bytes, zero-extended to the family
/// width with trailing bits past the mask cleared.
///
/// A byte length running past the end of the input, or a bit length past the
/// family width, aborts the loop and returns everything decoded so far;
/// real-world archives contain such partial lists.
pub fn parse_prefix_list(mut input: &[u8], is_v6: bool) -> Vec<NetworkPrefix> {
    let mut prefixes = Vec::with_capacity(input.len() / 2);

    while input.remaining() > 1 {
        let bit_len = match input.read_u8() {
            Ok(v) => v,
            Err(_) => break,
        };
        let byte_len = (bit_len as usize + 7) / 8;
        let max_bits: u8 = if is_v6 { 128 } else { 32 };

        if bit_len > max_bits || byte_len < 1 || byte_len > input.remaining() {
            warn!(
                "prefix list: {} bytes requested for /{} with {} available, returning {} prefixes",
                byte_len,
                bit_len,
                input.remaining(),
                prefixes.len()
            );
            break;
        }

        let prefix = match is_v6 {
            false => {
                let mut buff = [0u8; 4];
                if input.read_exact(&mut buff[..byte_len]).is_err() {
                    break;
                }
                match Ipv4Net::new(Ipv4Addr::from(buff), bit_len) {
                    // trunc() clears any bits past the mask that the wire
                    // left set
                    Ok(net) => IpNet::V4(net.trunc()),
                    Err(_) => break,
                }
            }
            true => {
                let mut buff = [0u8; 16];
                if input.read_exact(&mut buff[..byte_len]).is_err() {
                    break;
                }
                match Ipv6Net::new(Ipv6Addr::from(buff), bit_len) {
                    Ok(net) => IpNet::V6(net.trunc()),
                    Err(_) => break,
                }
            }
        };

        prefixes.push(NetworkPrefix::new(prefix));
    }

    prefixes
}
