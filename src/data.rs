use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::dialect::Dialect;

/// Strict timestamp format shared by both dialects (after joining split
/// date/time columns with a single space).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Written for any info-line field that disagrees across a merge set.
pub const MERGED_SENTINEL: &str = "-- merged --";

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).ok()
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// One data cell: a coerced numeric value, or the dialect's missing token.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum CellValue {
    Number(f64),
    Missing,
}

impl CellValue {
    /// Coerces a raw field. The dialect's missing token and anything that
    /// fails numeric parsing both become `Missing`; coercion never errors.
    pub fn coerce(raw: &str, missing_token: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == missing_token {
            return CellValue::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => CellValue::Number(v),
            Err(_) => CellValue::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn render(&self, missing_token: &str) -> String {
        match self {
            CellValue::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    v.to_string()
                }
            }
            CellValue::Missing => missing_token.to_string(),
        }
    }
}

// Bitwise equality so duplicate-record detection matches the on-disk bytes
// (NaN payloads included) rather than float semantics.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Missing, CellValue::Missing) => true,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

/// Units and sampling statistic declared for one variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    pub units: String,
    /// Empty for dialects without a sampling line.
    pub sampling: String,
}

/// Insertion-ordered variable -> HeaderEntry mapping. Order reflects file
/// column order and is preserved through merges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeaderTable {
    entries: Vec<(String, HeaderEntry)>,
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a variable, keeping the first occurrence on duplicate names.
    pub fn push(&mut self, name: impl Into<String>, entry: HeaderEntry) {
        let name = name.into();
        if !self.contains(&name) {
            self.entries.push((name, entry));
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderEntry> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, e)| e)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a copy with one variable's units replaced (alias renaming).
    pub fn with_units(&self, name: &str, units: &str) -> HeaderTable {
        let entries = self
            .entries
            .iter()
            .map(|(n, e)| {
                if n == name {
                    (
                        n.clone(),
                        HeaderEntry {
                            units: units.to_string(),
                            sampling: e.sampling.clone(),
                        },
                    )
                } else {
                    (n.clone(), e.clone())
                }
            })
            .collect();
        HeaderTable { entries }
    }
}

/// One conditioned data row, values aligned with the owning table's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub timestamp: NaiveDateTime,
    pub values: Vec<CellValue>,
}

/// Timestamp-ordered table of conditioned rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSeriesTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl TimeSeriesTable {
    pub fn sort_by_timestamp(&mut self) {
        self.rows.sort_by_key(|row| row.timestamp);
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.rows.iter().map(|row| row.timestamp)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.first().map(|row| row.timestamp)
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.rows.last().map(|row| row.timestamp)
    }

    /// Returns a copy whose rows are re-aligned to `columns`; variables this
    /// table does not carry become `Missing`.
    pub fn projected(&self, columns: &[String]) -> TimeSeriesTable {
        let source_index: Vec<Option<usize>> =
            columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| Row {
                timestamp: row.timestamp,
                values: source_index
                    .iter()
                    .map(|idx| match idx {
                        Some(i) => row.values[*i],
                        None => CellValue::Missing,
                    })
                    .collect(),
            })
            .collect();
        TimeSeriesTable {
            columns: columns.to_vec(),
            rows,
        }
    }
}

/// Station/program identity parsed from a logger-table info line.
/// Dialects without an info line carry placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub format: String,
    pub station: String,
    pub logger_model: String,
    pub serial_number: String,
    pub os_version: String,
    pub program_name: String,
    pub program_signature: String,
    pub table_name: String,
}

impl FileInfo {
    pub const FIELD_COUNT: usize = 8;

    pub fn placeholder() -> FileInfo {
        FileInfo {
            format: "none".to_string(),
            station: "unknown".to_string(),
            logger_model: "unknown".to_string(),
            serial_number: "unknown".to_string(),
            os_version: "unknown".to_string(),
            program_name: "unknown".to_string(),
            program_signature: "unknown".to_string(),
            table_name: "unknown".to_string(),
        }
    }

    pub fn from_fields(fields: &[String]) -> FileInfo {
        let field = |idx: usize| -> String {
            fields
                .get(idx)
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| "unknown".to_string())
        };
        FileInfo {
            format: field(0),
            station: field(1),
            logger_model: field(2),
            serial_number: field(3),
            os_version: field(4),
            program_name: field(5),
            program_signature: field(6),
            table_name: field(7),
        }
    }

    pub fn to_fields(&self) -> [String; Self::FIELD_COUNT] {
        [
            self.format.clone(),
            self.station.clone(),
            self.logger_model.clone(),
            self.serial_number.clone(),
            self.os_version.clone(),
            self.program_name.clone(),
            self.program_signature.clone(),
            self.table_name.clone(),
        ]
    }

    /// Field-wise reconciliation: agreeing fields pass through, disagreeing
    /// fields become the merged sentinel rather than an arbitrary pick.
    pub fn merged_with(&self, other: &FileInfo) -> FileInfo {
        let pick = |a: &str, b: &str| -> String {
            if a == b {
                a.to_string()
            } else {
                MERGED_SENTINEL.to_string()
            }
        };
        FileInfo {
            format: pick(&self.format, &other.format),
            station: pick(&self.station, &other.station),
            logger_model: pick(&self.logger_model, &other.logger_model),
            serial_number: pick(&self.serial_number, &other.serial_number),
            os_version: pick(&self.os_version, &other.os_version),
            program_name: pick(&self.program_name, &other.program_name),
            program_signature: pick(&self.program_signature, &other.program_signature),
            table_name: pick(&self.table_name, &other.table_name),
        }
    }
}

impl fmt::Display for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} ({})",
            self.station, self.program_name, self.logger_model
        )
    }
}

/// Fully conditioned view of one input file. Constructed once by the reader
/// and immutable thereafter; re-parsing requires a new handle.
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub path: PathBuf,
    pub dialect: Dialect,
    pub info: FileInfo,
    pub header: HeaderTable,
    pub table: TimeSeriesTable,
    pub base_interval_minutes: i64,
    /// Rows discarded for unparsable timestamps (counted, never fatal).
    pub dropped_rows: usize,
}

impl FileHandle {
    pub fn variables(&self) -> Vec<String> {
        self.header.variables().map(|v| v.to_string()).collect()
    }

    pub fn date_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.table.first_timestamp()?, self.table.last_timestamp()?))
    }
}
