//! I/O helpers shared by the reader and the writers.
//!
//! All file I/O flows through this module: encoding resolution and decoding
//! via `encoding_rs` (UTF-8 default), dialect-aware CSV reader/writer
//! construction, and the `-` path convention for stdout.

use std::{
    fs::File,
    io::{BufWriter, ErrorKind, Read, Write},
    path::Path,
};

use anyhow::{Result as AnyResult, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::{
    dialect::DialectSpec,
    error::{MergeError, Result},
};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> AnyResult<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Reads and decodes an entire input file. Logger files are small enough
/// that the whole-file read keeps every downstream computation pure.
pub fn read_decoded(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let mut file = File::open(path).map_err(|err| {
        if err.kind() == ErrorKind::NotFound {
            MergeError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MergeError::Io {
                path: path.to_path_buf(),
                source: err,
            }
        }
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|err| MergeError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    let (text, _, _) = encoding.decode(&bytes);
    Ok(text.into_owned())
}

pub fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}

/// CSV reader over in-memory content, configured for one dialect. Header
/// and data rows are all plain records; callers index by line position.
pub fn dialect_reader<'a>(content: &'a str, spec: &DialectSpec) -> csv::Reader<&'a [u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(spec.delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(content.as_bytes())
}

/// Writer for merged output in the master's dialect.
pub fn dialect_writer(path: &Path, spec: &DialectSpec) -> Result<csv::Writer<Box<dyn Write>>> {
    let base: Box<dyn Write> = if is_dash(path) {
        Box::new(std::io::stdout())
    } else {
        Box::new(BufWriter::new(File::create(path).map_err(|err| {
            MergeError::Io {
                path: path.to_path_buf(),
                source: err,
            }
        })?))
    };
    let quote_style = if spec.quote_all {
        QuoteStyle::Always
    } else {
        QuoteStyle::Necessary
    };
    Ok(csv::WriterBuilder::new()
        .delimiter(spec.delimiter)
        .quote_style(quote_style)
        .double_quote(true)
        .flexible(true)
        .from_writer(base))
}

pub fn write_text(path: &Path, content: &str) -> Result<()> {
    let io_err = |err| MergeError::Io {
        path: path.to_path_buf(),
        source: err,
    };
    if is_dash(path) {
        std::io::stdout()
            .write_all(content.as_bytes())
            .map_err(io_err)
    } else {
        std::fs::write(path, content).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;

    #[test]
    fn missing_file_maps_to_file_not_found() {
        let err = read_decoded(Path::new("/no/such/file.dat"), UTF_8).unwrap_err();
        assert!(matches!(err, MergeError::FileNotFound { .. }));
    }

    #[test]
    fn dialect_reader_honors_tab_delimiter() {
        let content = "Date\tTime\tAirTemp\n2024-01-01\t00:00:00\t1.5\n";
        let mut reader = dialect_reader(content, Dialect::SummaryExport.spec());
        let records: Vec<csv::StringRecord> =
            reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][2], "AirTemp");
        assert_eq!(&records[1][0], "2024-01-01");
    }

    #[test]
    fn resolve_encoding_defaults_to_utf8() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert!(resolve_encoding(Some("latin1")).is_ok());
        assert!(resolve_encoding(Some("not-an-encoding")).is_err());
    }
}
