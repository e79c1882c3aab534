#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Renders logger-table content: info line, variable/units/sampling header
/// lines, then one fully quoted data row per (timestamp, values) pair.
pub fn logger_table(
    station: &str,
    variables: &[(&str, &str, &str)],
    rows: &[(&str, Vec<&str>)],
) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "\"TOA5\",\"{station}\",\"CR300\",\"12345\",\"CR300.Std.10\",\"MET.CR3\",\"1771\",\"Hourly\""
    ));
    let quote_join = |fields: Vec<String>| -> String {
        fields
            .iter()
            .map(|f| format!("\"{f}\""))
            .collect::<Vec<_>>()
            .join(",")
    };
    let mut variable_line = vec!["TIMESTAMP".to_string()];
    let mut units_line = vec!["TS".to_string()];
    let mut sampling_line = vec![String::new()];
    for (name, units, sampling) in variables {
        variable_line.push(name.to_string());
        units_line.push(units.to_string());
        sampling_line.push(sampling.to_string());
    }
    lines.push(quote_join(variable_line));
    lines.push(quote_join(units_line));
    lines.push(quote_join(sampling_line));
    for (timestamp, values) in rows {
        let mut fields = vec![timestamp.to_string()];
        fields.extend(values.iter().map(|v| v.to_string()));
        lines.push(quote_join(fields));
    }
    lines.join("\n")
}

/// Renders summary-export content: variable and units header lines, then
/// tab-separated rows with split date/time columns.
pub fn summary_export(variables: &[(&str, &str)], rows: &[(&str, &str, Vec<&str>)]) -> String {
    let mut lines = Vec::new();
    let mut variable_line = vec!["Date".to_string(), "Time".to_string()];
    let mut units_line = vec![String::new(), String::new()];
    for (name, units) in variables {
        variable_line.push(name.to_string());
        units_line.push(units.to_string());
    }
    lines.push(variable_line.join("\t"));
    lines.push(units_line.join("\t"));
    for (date, time, values) in rows {
        let mut fields = vec![date.to_string(), time.to_string()];
        fields.extend(values.iter().map(|v| v.to_string()));
        lines.push(fields.join("\t"));
    }
    lines.join("\n")
}

/// Hourly logger-table rows covering `days` whole days starting at
/// `start_day` (1-based, January 2024), one variable value per row.
pub fn hourly_rows(start_day: u32, days: u32) -> Vec<(String, Vec<String>)> {
    let mut rows = Vec::new();
    for day in start_day..start_day + days {
        for hour in 0..24 {
            rows.push((
                format!("2024-01-{day:02} {hour:02}:00:00"),
                vec![format!("{}.5", day * 100 + hour)],
            ));
        }
    }
    rows
}

/// Borrowing adapter for the fixture builders above.
pub fn as_row_refs(rows: &[(String, Vec<String>)]) -> Vec<(&str, Vec<&str>)> {
    rows.iter()
        .map(|(ts, values)| {
            (
                ts.as_str(),
                values.iter().map(|v| v.as_str()).collect::<Vec<_>>(),
            )
        })
        .collect()
}
