/*!
Record framing: pure splitters that locate record boundaries in a byte
window, and the buffered scanner that drives them over a reader.

The splitters never allocate and never consume bytes on their own; they
report how far the caller may advance and where the token lies inside the
window. The scanner owns a single growable buffer bounded by a configurable
maximum token size.
*/
use crate::error::ParserError;
use std::io::Read;

/// Fixed MRT common header length in bytes.
pub const MRT_HEADER_LEN: usize = 12;

/// Default maximum record size accepted by the scanner (1 MiB). The dump
/// utility raises this to 16 MiB for RIB archives.
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 1 << 20;

const INITIAL_BUF_SIZE: usize = 64 * 1024;

/// Which length-prefix layout the scanner splits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// MRT records: 12-byte header whose bytes [8..12) hold the big-endian
    /// payload length; the token is the whole record including the header.
    Mrt,
    /// Record-file entries: a bare big-endian u32 payload length; the token
    /// is the payload without the prefix.
    LengthPrefixed,
}

/// Outcome of one split attempt over a byte window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    /// The window does not hold a complete record yet.
    Incomplete,
    /// A token occupying `window[start..start + len]`; the caller advances
    /// by `advance` bytes.
    Token {
        advance: usize,
        start: usize,
        len: usize,
    },
    /// Clean end of stream.
    End,
}

/// Split one MRT record off the window.
///
/// At EOF with a non-empty window that holds no complete record, the
/// remaining bytes are returned verbatim as a final token so that a trailing
/// partial record surfaces as a decode error instead of silent truncation.
pub fn split_mrt(window: &[u8], at_eof: bool) -> Result<Split, ParserError> {
    if window.len() >= MRT_HEADER_LEN {
        let payload_len = u32::from_be_bytes(window[8..12].try_into().unwrap()) as usize;
        let total_len = MRT_HEADER_LEN + payload_len;
        if window.len() >= total_len {
            return Ok(Split::Token {
                advance: total_len,
                start: 0,
                len: total_len,
            });
        }
    }

    if at_eof {
        if window.is_empty() {
            return Ok(Split::End);
        }
        return Ok(Split::Token {
            advance: window.len(),
            start: 0,
            len: window.len(),
        });
    }

    Ok(Split::Incomplete)
}

/// Split one length-prefixed record-file entry off the window.
///
/// Unlike MRT framing, a truncated tail at EOF is an error: record files are
/// written by this crate and a partial entry means the file is corrupt.
pub fn split_length_prefixed(window: &[u8], at_eof: bool) -> Result<Split, ParserError> {
    if window.len() >= 4 {
        let payload_len = u32::from_be_bytes(window[..4].try_into().unwrap()) as usize;
        if window.len() >= 4 + payload_len {
            return Ok(Split::Token {
                advance: 4 + payload_len,
                start: 4,
                len: payload_len,
            });
        }
        if at_eof {
            return Err(ParserError::ShortBuffer {
                name: "record payload",
                expected: payload_len,
                found: window.len() - 4,
            });
        }
        return Ok(Split::Incomplete);
    }

    if at_eof {
        if window.is_empty() {
            return Ok(Split::End);
        }
        return Err(ParserError::ShortBuffer {
            name: "record length prefix",
            expected: 4,
            found: window.len(),
        });
    }

    Ok(Split::Incomplete)
}

fn split(framing: Framing, window: &[u8], at_eof: bool) -> Result<Split, ParserError> {
    match framing {
        Framing::Mrt => split_mrt(window, at_eof),
        Framing::LengthPrefixed => split_length_prefixed(window, at_eof),
    }
}

/// Buffered record scanner over any [Read] source.
///
/// The backing buffer grows on demand up to the maximum token size; a record
/// that would not fit is a fatal scanner error. Tokens are views into the
/// buffer valid until the next call.
pub struct RecordScanner<R> {
    reader: R,
    framing: Framing,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    eof: bool,
    max_token_size: usize,
}

impl<R: Read> RecordScanner<R> {
    pub fn new(reader: R, framing: Framing) -> Self {
        Self::with_max_token_size(reader, framing, DEFAULT_MAX_TOKEN_SIZE)
    }

    pub fn with_max_token_size(reader: R, framing: Framing, max_token_size: usize) -> Self {
        RecordScanner {
            reader,
            framing,
            buf: vec![0u8; INITIAL_BUF_SIZE.min(max_token_size)],
            start: 0,
            end: 0,
            eof: false,
            max_token_size,
        }
    }

    /// Produce the next token, or `None` at clean end of stream.
    pub fn next_token(&mut self) -> Result<Option<&[u8]>, ParserError> {
        let token = loop {
            let window = &self.buf[self.start..self.end];
            match split(self.framing, window, self.eof)? {
                Split::Token {
                    advance,
                    start,
                    len,
                } => break Some((self.start + start, len, advance)),
                Split::End => break None,
                Split::Incomplete => self.fill()?,
            }
        };

        match token {
            None => Ok(None),
            Some((abs_start, len, advance)) => {
                self.start += advance;
                Ok(Some(&self.buf[abs_start..abs_start + len]))
            }
        }
    }

    /// Read more bytes into the buffer, compacting and growing it as needed.
    fn fill(&mut self) -> Result<(), ParserError> {
        if self.eof {
            // a splitter must terminate once at_eof is set; refuse to loop
            return Err(ParserError::ShortBuffer {
                name: "record stream",
                expected: self.end - self.start + 1,
                found: self.end - self.start,
            });
        }

        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        if self.end == self.buf.len() {
            if self.buf.len() >= self.max_token_size {
                return Err(ParserError::Unsupported(format!(
                    "record exceeds maximum token size of {} bytes",
                    self.max_token_size
                )));
            }
            let new_len = (self.buf.len() * 2).min(self.max_token_size);
            self.buf.resize(new_len, 0);
        }

        let n = self.reader.read(&mut self.buf[self.end..])?;
        if n == 0 {
            self.eof = true;
        } else {
            self.end += n;
        }
        Ok(())
    }
}
