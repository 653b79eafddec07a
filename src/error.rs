use std::fmt::{Display, Formatter};
use std::{error::Error, fmt, io};

/// Parser error enum.
///
/// Every decoding stage surfaces its failures through this type. Record-level
/// errors are reported per record and do not terminate the stream; only
/// scanner-level I/O errors do.
#[derive(Debug)]
pub enum ParserError {
    IoError(io::Error),
    /// Fewer bytes available than a declared length requires.
    ShortBuffer {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    /// MRT entry type this crate does not dispatch on.
    UnsupportedType(u16),
    /// Known MRT entry type with an unknown or unhandled subtype.
    UnsupportedSubtype {
        entry_type: &'static str,
        subtype: u16,
    },
    /// Address family other than IPv4 (1) or IPv6 (2).
    UnsupportedAfi(u16),
    /// Attribute length or payload inconsistent with its code's contract.
    MalformedAttribute {
        code: u8,
        reason: String,
    },
    /// User-supplied prefix string failed to parse at filter construction.
    PrefixConfig(String),
    /// Record file opened in footed mode has no footer trailer.
    FooterMissing,
    /// The last four bytes of a footed record file are not the magic number.
    FooterMagicMismatch {
        found: u32,
    },
    /// The footer JSON object could not be parsed.
    FooterParse(String),
    ParseError(String),
    Unsupported(String),
}

impl Error for ParserError {}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let message = match self {
            ParserError::IoError(e) => e.to_string(),
            ParserError::ShortBuffer {
                name,
                expected,
                found,
            } => {
                format!("short buffer reading {name}: expected {expected} bytes, found {found}")
            }
            ParserError::UnsupportedType(t) => format!("unsupported MRT type: {t}"),
            ParserError::UnsupportedSubtype {
                entry_type,
                subtype,
            } => format!("unsupported {entry_type} subtype: {subtype}"),
            ParserError::UnsupportedAfi(afi) => format!("unsupported address family: {afi}"),
            ParserError::MalformedAttribute { code, reason } => {
                format!("malformed attribute {code}: {reason}")
            }
            ParserError::PrefixConfig(s) => format!("invalid prefix configuration: {s}"),
            ParserError::FooterMissing => "record file has no footer".to_string(),
            ParserError::FooterMagicMismatch { found } => {
                format!("record file footer magic mismatch: found {found:#x}")
            }
            ParserError::FooterParse(s) => format!("record file footer unparseable: {s}"),
            ParserError::ParseError(s) => s.to_owned(),
            ParserError::Unsupported(s) => s.to_owned(),
        };
        write!(f, "{}", message)
    }
}

impl From<io::Error> for ParserError {
    fn from(io_error: io::Error) -> Self {
        ParserError::IoError(io_error)
    }
}

impl From<ipnet::AddrParseError> for ParserError {
    fn from(error: ipnet::AddrParseError) -> Self {
        ParserError::PrefixConfig(error.to_string())
    }
}
