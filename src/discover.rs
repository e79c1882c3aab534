//! Candidate discovery by file-naming convention.
//!
//! Logger backups sit next to the master as `<master-stem>*.backup`;
//! rotated summary exports share a `_summary` stem substring. When no
//! master is named, the most recently dated match is promoted to master.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use log::debug;

use crate::dialect::{CandidatePattern, Dialect};

/// Files in `directory` eligible as candidates for `master`.
pub fn candidates_for(directory: &Path, master: &Path, dialect: Dialect) -> Result<Vec<PathBuf>> {
    let pattern = dialect.spec().candidate_pattern;
    let master_stem = file_stem(master);
    let mut found = Vec::new();
    for entry in list_files(directory)? {
        if entry == master {
            continue;
        }
        let matches = match pattern {
            CandidatePattern::StemWithExtension { extension } => {
                file_stem(&entry).starts_with(&master_stem)
                    && entry
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
            }
            CandidatePattern::StemContains { substring } => {
                file_stem(&entry).contains(substring)
            }
        };
        if matches {
            debug!("Discovered candidate {:?}", entry);
            found.push(entry);
        }
    }
    found.sort();
    Ok(found)
}

/// All convention-matching files in `directory`, with the most recently
/// dated match promoted to master and the rest as candidates.
pub fn select_master(directory: &Path, dialect: Dialect) -> Result<(PathBuf, Vec<PathBuf>)> {
    let pattern = dialect.spec().candidate_pattern;
    let mut matches: Vec<PathBuf> = list_files(directory)?
        .into_iter()
        .filter(|path| match pattern {
            CandidatePattern::StemWithExtension { extension } => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension)),
            CandidatePattern::StemContains { substring } => {
                file_stem(path).contains(substring)
            }
        })
        .collect();

    // Date stamped in the name beats filesystem mtime; mtime breaks on copy.
    matches.sort_by_key(|path| {
        (
            stem_date(&file_stem(path)),
            std::fs::metadata(path)
                .and_then(|m| m.modified())
                .ok(),
            path.clone(),
        )
    });
    let master = matches.pop().ok_or_else(|| {
        anyhow!(
            "No {} files matching the naming convention in {:?}",
            dialect,
            directory
        )
    })?;
    Ok((master, matches))
}

fn list_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(directory)
        .with_context(|| format!("Reading directory {directory:?}"))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Reading directory entry in {directory:?}"))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string()
}

/// Extracts the last date token embedded in a file stem, accepting
/// `YYYY-MM-DD` and `YYYYMMDD` spellings.
fn stem_date(stem: &str) -> Option<NaiveDate> {
    let bytes = stem.as_bytes();
    let mut best = None;
    for start in 0..bytes.len() {
        for len in [10usize, 8] {
            let Some(slice) = stem.get(start..start + len) else {
                continue;
            };
            let format = if len == 10 { "%Y-%m-%d" } else { "%Y%m%d" };
            if let Ok(date) = NaiveDate::parse_from_str(slice, format) {
                best = best.max(Some(date));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_date_accepts_both_spellings() {
        assert_eq!(
            stem_date("STATION_7_20240115_backup"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            stem_date("met_summary_2024-02-01"),
            NaiveDate::from_ymd_opt(2024, 2, 1)
        );
        assert_eq!(stem_date("no_date_here"), None);
    }

    #[test]
    fn stem_date_prefers_the_latest_embedded_date() {
        assert_eq!(
            stem_date("from_20240101_to_20240301"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
    }
}
