/*!
Iterator implementations over [MrtParser].

`FallibleRecordIterator` returns `Result`s so consumers can see which
records failed to decode; `RecordIterator` logs and skips failures.
Both deliver records in file order and apply the parser's filters.
*/
use crate::error::ParserError;
use crate::models::MrtRecord;
use crate::parser::MrtParser;
use log::warn;
use std::io::Read;

/// Iterator over decoded records that surfaces per-record errors.
///
/// A decode error does not end the stream; iteration continues with the
/// next framed record.
pub struct FallibleRecordIterator<R> {
    parser: MrtParser<R>,
    record_count: u64,
}

impl<R> FallibleRecordIterator<R> {
    pub(crate) fn new(parser: MrtParser<R>) -> Self {
        FallibleRecordIterator {
            parser,
            record_count: 0,
        }
    }

    /// Ordinal of the latest iterator result, counting records that failed
    /// to decode. Useful for error reporting.
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn parser(&self) -> &MrtParser<R> {
        &self.parser
    }
}

impl<R: Read> Iterator for FallibleRecordIterator<R> {
    type Item = Result<MrtRecord, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.record_count += 1;
        match self.parser.next_matching_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => match e {
                // I/O failures end the stream
                ParserError::IoError(_) => {
                    warn!("stream error after {} records: {}", self.record_count, e);
                    None
                }
                other => Some(Err(other)),
            },
        }
    }
}

/// Iterator over decoded records that logs and skips failures.
pub struct RecordIterator<R> {
    inner: FallibleRecordIterator<R>,
}

impl<R> RecordIterator<R> {
    pub(crate) fn new(parser: MrtParser<R>) -> Self {
        RecordIterator {
            inner: FallibleRecordIterator::new(parser),
        }
    }
}

impl<R: Read> Iterator for RecordIterator<R> {
    type Item = MrtRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next() {
                None => return None,
                Some(Ok(record)) => return Some(record),
                Some(Err(e)) => {
                    warn!("skipping record {}: {}", self.inner.record_count(), e);
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;

    /// A BGP4MP AS4 record announcing 192.0.2.0/24, preceded by a record of
    /// an unknown MRT type.
    fn mixed_stream() -> Vec<u8> {
        let mut stream = vec![
            0, 0, 0, 1, // timestamp
            0, 99, // unknown entry type
            0, 0, // subtype
            0, 0, 0, 2, // length
            0xde, 0xad,
        ];

        let mut body = vec![
            0, 0, 0xfd, 0xe8, // peer ASN
            0, 0, 0xfd, 0xe9, // local ASN
            0, 1, // interface index
            0, 1, // AFI: IPv4
            10, 0, 0, 1, // peer IP
            10, 0, 0, 2, // local IP
        ];
        body.extend_from_slice(&[0xff; 16]);
        body.extend_from_slice(&[0, 27]);
        body.push(2);
        body.extend_from_slice(&[0, 0, 0, 0, 24, 192, 0, 2]);

        stream.extend_from_slice(&[
            0, 0, 0, 2, // timestamp
            0, 16, // BGP4MP
            0, 4, // MESSAGE_AS4
        ]);
        stream.extend_from_slice(&(body.len() as u32).to_be_bytes());
        stream.extend_from_slice(&body);
        stream
    }

    #[test]
    fn test_fallible_iterator_continues_after_error() {
        let stream = mixed_stream();
        let parser = MrtParser::from_reader(stream.as_slice());
        let results: Vec<_> = parser.into_fallible_record_iter().collect();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        let record = results[1].as_ref().unwrap();
        assert_eq!(record.common_header.timestamp, 2);
        assert!(matches!(record.message, MrtMessage::Bgp4Mp(_)));
    }

    #[test]
    fn test_skipping_iterator_drops_errors() {
        let stream = mixed_stream();
        let parser = MrtParser::from_reader(stream.as_slice());
        let records: Vec<_> = parser.into_iter().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].common_header.timestamp, 2);
    }

    #[test]
    fn test_empty_stream() {
        let parser = MrtParser::from_reader(&[][..]);
        assert_eq!(parser.into_fallible_record_iter().count(), 0);
    }
}
