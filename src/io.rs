use crate::ParserError;
use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};

/// Open a local archive file for reading, transparently decompressing
/// bzip2 (`.bz2`) and gzip (`.gz`) files based on the filename suffix.
/// Anything else is treated as raw MRT.
pub(crate) fn get_reader(path: &str) -> Result<Box<dyn Read + Send>, ParserError> {
    let file = BufReader::new(File::open(path)?);

    let reader: Box<dyn Read + Send> = match path.rsplit('.').next() {
        Some("bz2") => Box::new(BzDecoder::new(file)),
        Some("gz") => Box::new(GzDecoder::new(file)),
        _ => Box::new(file),
    };
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_plain_file_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.mrt");
        std::fs::write(&path, b"hello").unwrap();

        let mut reader = get_reader(path.to_str().unwrap()).unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"hello");
    }

    #[test]
    fn test_gz_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"compressed content").unwrap();
        encoder.finish().unwrap();

        let mut reader = get_reader(path.to_str().unwrap()).unwrap();
        let mut content = Vec::new();
        reader.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"compressed content");
    }

    #[test]
    fn test_missing_file() {
        assert!(get_reader("/nonexistent/file.mrt").is_err());
    }
}
