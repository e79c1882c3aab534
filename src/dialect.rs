//! Canonical dialect table for the supported tabular exports.
//!
//! Every component consumes the same two descriptors; there is deliberately
//! no other place in the crate that knows about header layout, separators,
//! or missing-value tokens.

use serde::Serialize;

use crate::error::{MergeError, Result};

/// How a dialect encodes the row timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampLayout {
    /// One column holding `YYYY-MM-DD HH:MM:SS`.
    Combined { column: &'static str },
    /// Separate date and time columns, joined with a single space.
    Split {
        date_column: &'static str,
        time_column: &'static str,
    },
}

/// Immutable descriptor of one recognized file dialect.
#[derive(Debug)]
pub struct DialectSpec {
    pub name: &'static str,
    /// First parsed field of the first physical line, used for detection.
    pub id_token: &'static str,
    pub info_line: Option<usize>,
    pub variable_line: usize,
    pub units_line: usize,
    pub sampling_line: Option<usize>,
    /// First physical line holding data; header-line indices are disjoint
    /// from this by construction.
    pub data_start_line: usize,
    pub delimiter: u8,
    /// LoggerTable quotes every field; SummaryExport quotes minimally.
    pub quote_all: bool,
    pub missing_token: &'static str,
    pub timestamp: TimestampLayout,
    /// Columns excluded from numeric coercion (the time-bearing ones).
    pub non_numeric_columns: &'static [&'static str],
    /// Substring used when discovering candidate files in a directory.
    pub candidate_pattern: CandidatePattern,
}

/// Naming convention for locating backup/rotated files next to a master.
#[derive(Debug, Clone, Copy)]
pub enum CandidatePattern {
    /// `<master-stem>*.backup`
    StemWithExtension { extension: &'static str },
    /// Any file whose stem contains the substring.
    StemContains { substring: &'static str },
}

static LOGGER_TABLE: DialectSpec = DialectSpec {
    name: "logger-table",
    id_token: "TOA5",
    info_line: Some(0),
    variable_line: 1,
    units_line: 2,
    sampling_line: Some(3),
    data_start_line: 4,
    delimiter: b',',
    quote_all: true,
    missing_token: "NAN",
    timestamp: TimestampLayout::Combined {
        column: "TIMESTAMP",
    },
    non_numeric_columns: &["TIMESTAMP"],
    candidate_pattern: CandidatePattern::StemWithExtension {
        extension: "backup",
    },
};

static SUMMARY_EXPORT: DialectSpec = DialectSpec {
    name: "summary-export",
    id_token: "Date",
    info_line: None,
    variable_line: 0,
    units_line: 1,
    sampling_line: None,
    data_start_line: 2,
    delimiter: b'\t',
    quote_all: false,
    missing_token: "NaN",
    timestamp: TimestampLayout::Split {
        date_column: "Date",
        time_column: "Time",
    },
    non_numeric_columns: &["Date", "Time"],
    candidate_pattern: CandidatePattern::StemContains {
        substring: "_summary",
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    LoggerTable,
    SummaryExport,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::LoggerTable, Dialect::SummaryExport];

    pub fn spec(self) -> &'static DialectSpec {
        match self {
            Dialect::LoggerTable => &LOGGER_TABLE,
            Dialect::SummaryExport => &SUMMARY_EXPORT,
        }
    }

    /// Minimum number of physical lines a file must have before data starts.
    pub fn min_header_lines(self) -> usize {
        self.spec().data_start_line
    }

    /// Matches the first physical line of a file against each dialect's
    /// identifier token (field 0, parsed with that dialect's separator and
    /// quoting).
    pub fn detect(first_line: &str) -> Result<Dialect> {
        for dialect in Dialect::ALL {
            if first_field(first_line, dialect.spec().delimiter) == dialect.spec().id_token {
                return Ok(dialect);
            }
        }
        Err(MergeError::UnknownDialect {
            token: first_field(first_line, b',').chars().take(32).collect(),
        })
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spec().name)
    }
}

fn first_field(line: &str, delimiter: u8) -> &str {
    let field = line
        .split(delimiter as char)
        .next()
        .unwrap_or("")
        .trim_end_matches(['\r', '\n']);
    field.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_logger_table_from_quoted_info_line() {
        let line = r#""TOA5","STATION_7","CR300","12345","CR300.Std.10","SAPFLOW.CR3","1771","Table1""#;
        assert_eq!(Dialect::detect(line).unwrap(), Dialect::LoggerTable);
    }

    #[test]
    fn detects_summary_export_from_variable_line() {
        let line = "Date\tTime\tAirTemp\tRH";
        assert_eq!(Dialect::detect(line).unwrap(), Dialect::SummaryExport);
    }

    #[test]
    fn rejects_unknown_first_field() {
        let err = Dialect::detect("timestamp,value").unwrap_err();
        assert!(matches!(
            err,
            MergeError::UnknownDialect { token } if token == "timestamp"
        ));
    }

    #[test]
    fn header_line_indices_are_disjoint_from_data_start() {
        for dialect in Dialect::ALL {
            let spec = dialect.spec();
            let mut header_lines = vec![spec.variable_line, spec.units_line];
            if let Some(line) = spec.info_line {
                header_lines.push(line);
            }
            if let Some(line) = spec.sampling_line {
                header_lines.push(line);
            }
            assert!(header_lines.iter().all(|l| *l < spec.data_start_line));
        }
    }
}
