//! Writes merged output in the master's dialect, header lines included.

use std::io::Write;
use std::path::Path;

use crate::{
    concat::ConcatenationResult,
    data::{DATE_FORMAT, TIME_FORMAT, format_timestamp},
    dialect::TimestampLayout,
    error::{MergeError, Result},
    io_utils,
};

// The logger dialect marks its timestamp column with these header values;
// they are constant across files and not carried in the header table.
const TIMESTAMP_UNITS: &str = "TS";

pub fn write_merged(result: &ConcatenationResult, path: &Path) -> Result<()> {
    let mut writer = io_utils::dialect_writer(path, result.dialect.spec())?;
    write_merged_to(&mut writer, result).map_err(|source| MergeError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

fn write_merged_to<W: Write>(
    writer: &mut csv::Writer<W>,
    result: &ConcatenationResult,
) -> std::result::Result<(), csv::Error> {
    let spec = result.dialect.spec();

    if spec.info_line.is_some() {
        writer.write_record(result.info.to_fields().iter())?;
    }

    let (time_headers, time_units): (Vec<&str>, Vec<&str>) = match spec.timestamp {
        TimestampLayout::Combined { column } => (vec![column], vec![TIMESTAMP_UNITS]),
        TimestampLayout::Split {
            date_column,
            time_column,
        } => (vec![date_column, time_column], vec!["", ""]),
    };

    let mut variable_line: Vec<&str> = time_headers.clone();
    variable_line.extend(result.header.variables());
    writer.write_record(&variable_line)?;

    let mut units_line: Vec<&str> = time_units;
    units_line.extend(result.header.iter().map(|(_, e)| e.units.as_str()));
    writer.write_record(&units_line)?;

    if spec.sampling_line.is_some() {
        let mut sampling_line: Vec<&str> = time_headers.iter().map(|_| "").collect();
        sampling_line.extend(result.header.iter().map(|(_, e)| e.sampling.as_str()));
        writer.write_record(&sampling_line)?;
    }

    for row in &result.table.rows {
        let mut record: Vec<String> = match spec.timestamp {
            TimestampLayout::Combined { .. } => vec![format_timestamp(row.timestamp)],
            TimestampLayout::Split { .. } => vec![
                row.timestamp.format(DATE_FORMAT).to_string(),
                row.timestamp.format(TIME_FORMAT).to_string(),
            ],
        };
        record.extend(row.values.iter().map(|v| v.render(spec.missing_token)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
