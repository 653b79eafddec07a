/*!
MRT stream parsing: the scanner-driven record reader and its iterators.

[MrtParser] frames an input stream into records, decodes each one through
the layered MRT → BGP4MP/TABLE_DUMP_V2 → BGP stages, and applies the
configured filters. Decode failures are per-record: the stream continues
with the next record, and only framing or I/O failures end it.
*/
pub mod bgp;
pub mod iters;
pub mod mrt;
pub mod scan;
pub mod utils;

pub(crate) use self::utils::ReadUtils;

pub use iters::{FallibleRecordIterator, RecordIterator};
pub use mrt::{parse_common_header, parse_mrt_body, parse_mrt_record};
pub use scan::{Framing, RecordScanner, Split, DEFAULT_MAX_TOKEN_SIZE};

use crate::error::ParserError;
use crate::filter::{Filter, Filterable};
use crate::io::get_reader;
use crate::models::*;
use std::io::Read;

/// Streaming MRT parser over any [Read] source.
///
/// Within one file the peer-index table of a TABLE_DUMP_V2 archive is
/// decoded first and retained for resolving the peer indices of the RIB
/// entries that follow it.
pub struct MrtParser<R> {
    scanner: RecordScanner<R>,
    filters: Vec<Filter>,
    peer_index: Option<PeerIndexTable>,
}

impl MrtParser<Box<dyn Read + Send>> {
    /// Open a local MRT archive. `.bz2` and `.gz` files are decompressed
    /// transparently based on the filename suffix.
    pub fn open(path: &str) -> Result<Self, ParserError> {
        Ok(Self::from_reader(get_reader(path)?))
    }

    /// Open a local MRT archive with a custom record size cap.
    pub fn open_with_max_token_size(
        path: &str,
        max_token_size: usize,
    ) -> Result<Self, ParserError> {
        Ok(Self::with_max_token_size(get_reader(path)?, max_token_size))
    }
}

impl<R: Read> MrtParser<R> {
    pub fn from_reader(reader: R) -> Self {
        MrtParser {
            scanner: RecordScanner::new(reader, Framing::Mrt),
            filters: vec![],
            peer_index: None,
        }
    }

    /// Set the maximum accepted record size. RIB archives can carry records
    /// well past the 1 MiB default.
    pub fn with_max_token_size(reader: R, max_token_size: usize) -> Self {
        MrtParser {
            scanner: RecordScanner::with_max_token_size(reader, Framing::Mrt, max_token_size),
            filters: vec![],
            peer_index: None,
        }
    }

    /// Add a filter; all configured filters must accept a record for it to
    /// be yielded by the iterators.
    pub fn add_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn add_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// The peer-index table seen on this stream, if any.
    pub fn peer_index(&self) -> Option<&PeerIndexTable> {
        self.peer_index.as_ref()
    }

    /// Frame and decode the next record, without filtering. `Ok(None)`
    /// signals clean end of stream.
    pub fn next_record(&mut self) -> Result<Option<MrtRecord>, ParserError> {
        let token = match self.scanner.next_token()? {
            Some(token) => token,
            None => return Ok(None),
        };

        let record = parse_mrt_record(token)?;
        if let MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(table)) = &record.message
        {
            self.peer_index = Some(table.clone());
        }
        Ok(Some(record))
    }

    /// Frame and decode records until one passes the configured filters.
    /// A peer-index table always passes.
    pub fn next_matching_record(&mut self) -> Result<Option<MrtRecord>, ParserError> {
        loop {
            let record = match self.next_record()? {
                Some(record) => record,
                None => return Ok(None),
            };

            if matches!(
                record.message,
                MrtMessage::TableDumpV2(TableDumpV2Message::PeerIndexTable(_))
            ) {
                return Ok(Some(record));
            }
            if record.match_filters(&self.filters) {
                return Ok(Some(record));
            }
        }
    }

    /// Iterator that surfaces per-record decode errors.
    pub fn into_fallible_record_iter(self) -> FallibleRecordIterator<R> {
        FallibleRecordIterator::new(self)
    }

    /// Iterator that logs and skips per-record decode errors.
    pub fn into_record_iter(self) -> RecordIterator<R> {
        RecordIterator::new(self)
    }
}

impl<R: Read> IntoIterator for MrtParser<R> {
    type Item = MrtRecord;
    type IntoIter = RecordIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        RecordIterator::new(self)
    }
}
