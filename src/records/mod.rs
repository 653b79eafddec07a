/*!
Length-prefixed record-file container.

Downstream consumers store decoded message blobs in files of
`{u32 big-endian length, payload}` entries. Two variants exist:

- **flat**: just the concatenated entries; the entry count is the caller's
  business.
- **footed**: the same body followed by a self-describing footer. Reading
  the file backwards: the last 4 bytes are the magic number `118864`, the 4
  bytes before it the length `L` of the JSON footer object (not counting
  the 8 trailer bytes), and the `L` bytes before that the footer itself.

The footer is itself length-prefixed like a record, so the read path first
locates and parses it, truncates the logical end of data to the footer
offset, and only then drives the record scanner. Appending to a footed file
strips the footer first: the pre-footer bytes are copied to a temporary
sibling which is renamed over the original, and writing proceeds from the
pre-footer offset. Closing a write handle appends a freshly computed
footer.
*/
use crate::error::ParserError;
use crate::parser::{Framing, RecordScanner, DEFAULT_MAX_TOKEN_SIZE};
use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Take, Write};
use std::path::{Path, PathBuf};

/// Magic number closing a footed record file.
pub const FOOTER_MAGIC: u32 = 118_864;

/// Footer format version written by this crate.
pub const RECORD_FILE_VERSION: u16 = 1;

/// Offsets of one record within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOffset {
    #[serde(rename = "RecordNumber")]
    pub record_number: u64,
    #[serde(rename = "Offset")]
    pub offset: u64,
}

/// One write session of a footed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "Compressed")]
    pub compressed: bool,
    #[serde(rename = "SectionNumber")]
    pub section_number: u32,
    #[serde(rename = "StartOffset")]
    pub start_offset: u64,
    #[serde(rename = "EndOffset")]
    pub end_offset: u64,
    #[serde(rename = "Offsets")]
    pub offsets: Vec<RecordOffset>,
}

/// The JSON footer object of a footed record file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    #[serde(rename = "NumEntries")]
    pub num_entries: u64,
    #[serde(rename = "FileVersion")]
    pub file_version: u16,
    #[serde(rename = "Dir")]
    pub dir: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Sections")]
    pub sections: Vec<Section>,
}

/// Container variant: with or without the trailing footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFileKind {
    Flat,
    Footed,
}

fn footer_paths(path: &Path) -> (String, String) {
    let dir = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    (dir, name)
}

/// Write handle for a record file.
pub struct RecordFileWriter {
    writer: BufWriter<File>,
    kind: RecordFileKind,
    footer: Footer,
    section: Section,
    /// Absolute offset of the next byte to be written.
    offset: u64,
}

impl RecordFileWriter {
    /// Create a new record file, truncating any existing one.
    pub fn create<P: AsRef<Path>>(path: P, kind: RecordFileKind) -> Result<Self, ParserError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let (dir, name) = footer_paths(path);

        Ok(RecordFileWriter {
            writer: BufWriter::new(file),
            kind,
            footer: Footer {
                num_entries: 0,
                file_version: RECORD_FILE_VERSION,
                dir,
                name,
                sections: vec![],
            },
            section: Section {
                compressed: false,
                section_number: 0,
                start_offset: 0,
                end_offset: 0,
                offsets: vec![],
            },
            offset: 0,
        })
    }

    /// Re-open an existing record file for appending.
    ///
    /// For a footed file the footer is read, stripped by rewriting the
    /// pre-footer bytes through a temporary sibling, and its entry count and
    /// sections carry over; new records continue the numbering. A missing
    /// file behaves like [RecordFileWriter::create].
    pub fn append<P: AsRef<Path>>(path: P, kind: RecordFileKind) -> Result<Self, ParserError> {
        let path = path.as_ref();
        if !path.exists() {
            return Self::create(path, kind);
        }

        match kind {
            RecordFileKind::Flat => {
                let offset = std::fs::metadata(path)?.len();
                let file = OpenOptions::new().append(true).open(path)?;
                let (dir, name) = footer_paths(path);
                Ok(RecordFileWriter {
                    writer: BufWriter::new(file),
                    kind,
                    footer: Footer {
                        num_entries: 0,
                        file_version: RECORD_FILE_VERSION,
                        dir,
                        name,
                        sections: vec![],
                    },
                    section: Section {
                        compressed: false,
                        section_number: 0,
                        start_offset: offset,
                        end_offset: offset,
                        offsets: vec![],
                    },
                    offset,
                })
            }
            RecordFileKind::Footed => {
                let (footer, data_end) = read_footer(path)?;
                strip_footer(path, data_end)?;

                let file = OpenOptions::new().append(true).open(path)?;
                let section = Section {
                    compressed: false,
                    section_number: footer.sections.len() as u32,
                    start_offset: data_end,
                    end_offset: data_end,
                    offsets: vec![],
                };
                Ok(RecordFileWriter {
                    writer: BufWriter::new(file),
                    kind,
                    footer,
                    section,
                    offset: data_end,
                })
            }
        }
    }

    /// Append one length-prefixed record.
    pub fn write_record(&mut self, payload: &[u8]) -> Result<(), ParserError> {
        self.writer.write_all(&(payload.len() as u32).to_be_bytes())?;
        self.writer.write_all(payload)?;

        self.section.offsets.push(RecordOffset {
            record_number: self.footer.num_entries,
            offset: self.offset,
        });
        self.footer.num_entries += 1;
        self.offset += 4 + payload.len() as u64;
        Ok(())
    }

    /// Records written across the lifetime of the file (for footed files)
    /// or this handle (for flat files).
    pub fn entries(&self) -> u64 {
        self.footer.num_entries
    }

    /// Flush buffered records and, for a footed file, append the footer
    /// trailer.
    pub fn close(mut self) -> Result<(), ParserError> {
        if matches!(self.kind, RecordFileKind::Footed) {
            self.section.end_offset = self.offset;
            self.footer.sections.push(self.section);

            let footer_json = serde_json::to_vec(&self.footer)
                .map_err(|e| ParserError::FooterParse(e.to_string()))?;

            let mut trailer = BytesMut::with_capacity(footer_json.len() + 8);
            trailer.put_slice(&footer_json);
            trailer.put_u32(footer_json.len() as u32);
            trailer.put_u32(FOOTER_MAGIC);
            self.writer.write_all(&trailer)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Probe the tail of `path` for a footer. Returns the parsed footer and the
/// offset where the data section ends (= where the footer begins).
fn read_footer(path: &Path) -> Result<(Footer, u64), ParserError> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    if size < 8 {
        return Err(ParserError::FooterMissing);
    }

    let mut trailer = [0u8; 8];
    file.seek(SeekFrom::End(-8))?;
    file.read_exact(&mut trailer)?;

    let magic = u32::from_be_bytes(trailer[4..8].try_into().unwrap());
    if magic != FOOTER_MAGIC {
        return Err(ParserError::FooterMagicMismatch { found: magic });
    }

    let footer_len = u32::from_be_bytes(trailer[..4].try_into().unwrap()) as u64;
    if footer_len + 8 > size {
        return Err(ParserError::FooterParse(format!(
            "footer length {} exceeds file size {}",
            footer_len, size
        )));
    }

    let data_end = size - 8 - footer_len;
    file.seek(SeekFrom::Start(data_end))?;
    let mut footer_json = vec![0u8; footer_len as usize];
    file.read_exact(&mut footer_json)?;

    let footer: Footer = serde_json::from_slice(&footer_json)
        .map_err(|e| ParserError::FooterParse(e.to_string()))?;
    Ok((footer, data_end))
}

/// Rewrite `path` with only its first `data_end` bytes, via a temporary
/// sibling file and an atomic rename.
fn strip_footer(path: &Path, data_end: u64) -> Result<(), ParserError> {
    let tmp_path = PathBuf::from(format!("{}.tmp", path.display()));
    {
        let mut source = File::open(path)?;
        let mut tmp = File::create(&tmp_path)?;
        std::io::copy(&mut std::io::Read::by_ref(&mut source).take(data_end), &mut tmp)?;
        tmp.flush()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read handle for a record file.
///
/// [RecordFileReader::open] probes the trailing magic to distinguish flat
/// from footed files; [RecordFileReader::open_footed] requires the footer.
/// The record scanner is driven over the data section only: for a footed
/// file the logical end of input sits at the footer offset, so the footer
/// (itself length-prefixed like a record) never reaches the scanner.
pub struct RecordFileReader {
    scanner: RecordScanner<Take<BufReader<File>>>,
    footer: Option<Footer>,
}

impl RecordFileReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParserError> {
        let path = path.as_ref();
        let (footer, data_end) = match read_footer(path) {
            Ok((footer, data_end)) => (Some(footer), data_end),
            Err(
                ParserError::FooterMissing | ParserError::FooterMagicMismatch { .. },
            ) => (None, std::fs::metadata(path)?.len()),
            Err(e) => return Err(e),
        };
        Self::with_data_end(path, footer, data_end)
    }

    /// Open a file that must carry a footer.
    pub fn open_footed<P: AsRef<Path>>(path: P) -> Result<Self, ParserError> {
        let path = path.as_ref();
        let (footer, data_end) = read_footer(path)?;
        Self::with_data_end(path, Some(footer), data_end)
    }

    fn with_data_end(
        path: &Path,
        footer: Option<Footer>,
        data_end: u64,
    ) -> Result<Self, ParserError> {
        let reader = BufReader::new(File::open(path)?).take(data_end);
        Ok(RecordFileReader {
            scanner: RecordScanner::with_max_token_size(
                reader,
                Framing::LengthPrefixed,
                DEFAULT_MAX_TOKEN_SIZE,
            ),
            footer,
        })
    }

    pub fn footer(&self) -> Option<&Footer> {
        self.footer.as_ref()
    }

    /// Entry count recorded in the footer, if the file has one.
    pub fn num_entries(&self) -> Option<u64> {
        self.footer.as_ref().map(|f| f.num_entries)
    }

    /// Read the next record payload, or `None` past the last record
    /// preceding the footer.
    pub fn next_record(&mut self) -> Result<Option<Bytes>, ParserError> {
        match self.scanner.next_token()? {
            Some(token) => Ok(Some(Bytes::copy_from_slice(token))),
            None => Ok(None),
        }
    }
}

impl Iterator for RecordFileReader {
    type Item = Result<Bytes, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}
