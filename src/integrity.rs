//! Structural integrity analysis: duplicate classification, base-interval
//! inference, gap distribution, and missing-record statistics.
//!
//! Everything here is a pure function over an already-conditioned table, so
//! the legality engine can be tested without file fixtures.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    data::{FileHandle, TimeSeriesTable},
    error::{MergeError, Result},
};

/// True where an entire row (timestamp included) is identical to an earlier
/// row. Such rows are safely droppable.
pub fn duplicate_records(table: &TimeSeriesTable) -> Vec<bool> {
    let rows = &table.rows;
    let mut mask = vec![false; rows.len()];
    for i in 1..rows.len() {
        // Rows are timestamp-sorted, so a full duplicate of an earlier row
        // can only sit inside the same-timestamp run just behind it.
        let mut j = i;
        while j > 0 && rows[j - 1].timestamp == rows[i].timestamp {
            j -= 1;
            if rows[j] == rows[i] {
                mask[i] = true;
                break;
            }
        }
    }
    mask
}

/// True where the timestamp repeats an earlier row but the content differs:
/// a genuine conflict that must be surfaced, never auto-resolved.
pub fn duplicate_indices(table: &TimeSeriesTable) -> Vec<bool> {
    let records = duplicate_records(table);
    let rows = &table.rows;
    let mut mask = vec![false; rows.len()];
    for i in 1..rows.len() {
        if rows[i - 1].timestamp == rows[i].timestamp && !records[i] {
            mask[i] = true;
        }
    }
    mask
}

/// Infers the base sampling interval in whole minutes from the
/// de-duplicated, sorted timestamp sequence.
///
/// The minimum delta and the modal delta must agree; disagreement means a
/// corrupted stream or mixed sampling rates, which nothing downstream may
/// paper over.
pub fn infer_interval(
    path: &Path,
    timestamps: impl Iterator<Item = NaiveDateTime>,
) -> Result<i64> {
    let unique: Vec<NaiveDateTime> = timestamps.dedup().collect();
    if unique.len() < 2 {
        return Err(MergeError::EmptyTable {
            path: path.to_path_buf(),
        });
    }
    let deltas: Vec<i64> = unique
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_minutes())
        .collect();

    let minimum = *deltas.iter().min().unwrap_or(&0);
    let counts = deltas.iter().copied().counts();
    // Smallest delta wins a frequency tie, for determinism.
    let modal = counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(delta, _)| delta)
        .unwrap_or(minimum);

    if minimum != modal {
        return Err(MergeError::AmbiguousInterval {
            path: path.to_path_buf(),
            minimum,
            modal,
        });
    }
    Ok(minimum)
}

/// Histogram of missing-record run lengths: for every inter-record delta
/// that is a multiple of the base interval greater than one, buckets
/// `multiple - 1` (the records missing inside that gap) against how often
/// that gap size occurs.
pub fn gap_distribution(table: &TimeSeriesTable, base_interval: i64) -> BTreeMap<i64, usize> {
    let mut histogram = BTreeMap::new();
    if base_interval <= 0 {
        return histogram;
    }
    let unique: Vec<NaiveDateTime> = table.timestamps().dedup().collect();
    for pair in unique.windows(2) {
        let delta = (pair[1] - pair[0]).num_minutes();
        let multiple = ((delta as f64) / (base_interval as f64)).round() as i64;
        if multiple >= 2 {
            *histogram.entry(multiple - 1).or_insert(0) += 1;
        }
    }
    histogram
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissingRecordStats {
    pub count: i64,
    pub percent: f64,
}

/// Theoretical full-range record count minus actual non-duplicate records;
/// percent rounded to two decimal places.
pub fn missing_record_stats(table: &TimeSeriesTable, base_interval: i64) -> MissingRecordStats {
    let (Some(first), Some(last)) = (table.first_timestamp(), table.last_timestamp()) else {
        return MissingRecordStats {
            count: 0,
            percent: 0.0,
        };
    };
    if base_interval <= 0 {
        return MissingRecordStats {
            count: 0,
            percent: 0.0,
        };
    }
    let expected = (last - first).num_minutes() / base_interval + 1;
    let duplicates = duplicate_records(table);
    let actual = duplicates.iter().filter(|d| !**d).count() as i64;
    let count = (expected - actual).max(0);
    let percent = if expected > 0 {
        ((count as f64 / expected as f64) * 10_000.0).round() / 100.0
    } else {
        0.0
    };
    MissingRecordStats { count, percent }
}

/// Integrity roll-up for one conditioned file, as shown by `inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct IntegritySummary {
    pub base_interval_minutes: i64,
    pub gap_distribution: BTreeMap<i64, usize>,
    pub missing: MissingRecordStats,
    pub duplicate_record_count: usize,
    pub duplicate_index_count: usize,
    pub dropped_rows: usize,
}

pub fn summarize(handle: &FileHandle) -> IntegritySummary {
    let duplicate_record_count = duplicate_records(&handle.table)
        .iter()
        .filter(|d| **d)
        .count();
    let duplicate_index_count = duplicate_indices(&handle.table)
        .iter()
        .filter(|d| **d)
        .count();
    IntegritySummary {
        base_interval_minutes: handle.base_interval_minutes,
        gap_distribution: gap_distribution(&handle.table, handle.base_interval_minutes),
        missing: missing_record_stats(&handle.table, handle.base_interval_minutes),
        duplicate_record_count,
        duplicate_index_count,
        dropped_rows: handle.dropped_rows,
    }
}
