//! Dialect-aware file reading and conditioning.
//!
//! `read` produces a fully conditioned, immutable `FileHandle`: header lines
//! parsed into a `HeaderTable`, data rows timestamp-keyed and coerced to
//! numeric, rows with unparsable timestamps dropped (counted, never fatal),
//! and the whole table sorted ascending before interval inference.

use std::path::Path;

use csv::StringRecord;
use encoding_rs::Encoding;
use log::{debug, info};

use crate::{
    data::{self, CellValue, FileHandle, FileInfo, HeaderEntry, HeaderTable, Row, TimeSeriesTable},
    dialect::{Dialect, TimestampLayout},
    error::{MergeError, Result},
    integrity, io_utils,
};

pub fn read(path: &Path, dialect: Option<Dialect>, encoding: &'static Encoding) -> Result<FileHandle> {
    let content = io_utils::read_decoded(path, encoding)?;
    let handle = parse_content(path, &content, dialect)?;
    info!(
        "Read {:?} [{}]: {} row(s), {} variable(s), base interval {} min, {} dropped",
        path,
        handle.dialect,
        handle.table.rows.len(),
        handle.header.len(),
        handle.base_interval_minutes,
        handle.dropped_rows
    );
    Ok(handle)
}

/// Pure parsing core, separated from file I/O so conditioning is testable
/// on in-memory content.
pub fn parse_content(path: &Path, content: &str, dialect: Option<Dialect>) -> Result<FileHandle> {
    let dialect = match dialect {
        Some(d) => d,
        None => Dialect::detect(io_utils::first_line(content))?,
    };
    let spec = dialect.spec();

    let mut reader = io_utils::dialect_reader(content, spec);
    let mut records: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| MergeError::Csv {
            path: path.to_path_buf(),
            source: err,
        })?;
        records.push(record);
    }

    if records.len() < dialect.min_header_lines() {
        return Err(MergeError::NoHeaderLines {
            path: path.to_path_buf(),
            expected: dialect.min_header_lines(),
        });
    }

    let info = match spec.info_line {
        Some(line) => {
            let fields: Vec<String> = records[line].iter().map(|f| f.to_string()).collect();
            FileInfo::from_fields(&fields)
        }
        None => FileInfo::placeholder(),
    };

    let variable_row = &records[spec.variable_line];
    let units_row = &records[spec.units_line];
    let sampling_row = spec.sampling_line.map(|line| &records[line]);

    // Data columns are the variable-line entries minus the time-bearing
    // columns; the timestamp lives on the row key, not in the header table.
    let mut header = HeaderTable::new();
    let mut kept_columns: Vec<(String, usize)> = Vec::new();
    for (idx, name) in variable_row.iter().enumerate() {
        let name = name.trim();
        if name.is_empty() || spec.non_numeric_columns.contains(&name) {
            continue;
        }
        if header.contains(name) {
            continue;
        }
        header.push(
            name,
            HeaderEntry {
                units: units_row.get(idx).unwrap_or("").trim().to_string(),
                sampling: sampling_row
                    .and_then(|row| row.get(idx))
                    .unwrap_or("")
                    .trim()
                    .to_string(),
            },
        );
        kept_columns.push((name.to_string(), idx));
    }

    // Detection guarantees these columns exist; a forced dialect override
    // against the wrong file shape surfaces here instead.
    let timestamp_indices = timestamp_column_indices(spec.timestamp, variable_row).ok_or_else(
        || MergeError::NoHeaderLines {
            path: path.to_path_buf(),
            expected: dialect.min_header_lines(),
        },
    )?;

    let mut rows = Vec::new();
    let mut dropped_rows = 0usize;
    for record in records.iter().skip(spec.data_start_line) {
        let joined = join_timestamp_fields(&timestamp_indices, record);
        let Some(timestamp) = data::parse_timestamp(&joined) else {
            // Field loggers emit boundary garbage on power loss; drop the
            // row, count it, keep going.
            dropped_rows += 1;
            debug!("Dropping row with unparsable timestamp '{joined}' in {path:?}");
            continue;
        };
        let values = kept_columns
            .iter()
            .map(|(_, idx)| CellValue::coerce(record.get(*idx).unwrap_or(""), spec.missing_token))
            .collect();
        rows.push(Row { timestamp, values });
    }

    if rows.is_empty() {
        return Err(MergeError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    let mut table = TimeSeriesTable {
        columns: kept_columns.into_iter().map(|(name, _)| name).collect(),
        rows,
    };
    table.sort_by_timestamp();

    let base_interval_minutes = integrity::infer_interval(path, table.timestamps())?;

    Ok(FileHandle {
        path: path.to_path_buf(),
        dialect,
        info,
        header,
        table,
        base_interval_minutes,
        dropped_rows,
    })
}

/// Positions of the timestamp-bearing column(s) in file column order.
fn timestamp_column_indices(
    layout: TimestampLayout,
    variable_row: &StringRecord,
) -> Option<Vec<usize>> {
    let position = |name: &str| -> Option<usize> {
        variable_row.iter().position(|v| v.trim() == name)
    };
    match layout {
        TimestampLayout::Combined { column } => Some(vec![position(column)?]),
        TimestampLayout::Split {
            date_column,
            time_column,
        } => Some(vec![position(date_column)?, position(time_column)?]),
    }
}

fn join_timestamp_fields(indices: &[usize], record: &StringRecord) -> String {
    indices
        .iter()
        .map(|idx| record.get(*idx).unwrap_or("").trim())
        .collect::<Vec<_>>()
        .join(" ")
}
