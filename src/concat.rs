//! Concatenation of a master file with its legal candidates.
//!
//! Candidates are assessed, the legal subset gets alias renames applied,
//! rows are merged and re-sorted, duplicate records are removed (and
//! counted), and duplicate indices are surfaced but kept. Header merging is
//! first-occurrence-wins with the master first, which keeps column order
//! stable across repeated runs.

use log::{info, warn};

use crate::{
    assess::{self, MergeVerdict},
    data::{FileHandle, FileInfo, HeaderTable, TimeSeriesTable},
    dialect::Dialect,
    error::Result,
    integrity, report,
};

#[derive(Debug, Clone)]
pub struct ConcatenationResult {
    pub dialect: Dialect,
    pub info: FileInfo,
    pub header: HeaderTable,
    pub table: TimeSeriesTable,
    /// One verdict per candidate, in input order, legal or not.
    pub verdicts: Vec<MergeVerdict>,
    pub duplicate_records_removed: usize,
    pub duplicate_index_count: usize,
    pub report_lines: Vec<String>,
}

impl ConcatenationResult {
    pub fn merged_candidate_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_legal()).count()
    }

    pub fn report_text(&self) -> String {
        let mut text = self.report_lines.join("\n");
        text.push('\n');
        text
    }
}

pub fn concatenate(master: &FileHandle, candidates: &[FileHandle]) -> Result<ConcatenationResult> {
    let mut verdicts = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        verdicts.push(assess::assess(master, candidate)?);
    }

    let legal: Vec<(&FileHandle, &MergeVerdict)> = candidates
        .iter()
        .zip(&verdicts)
        .filter(|(_, verdict)| verdict.is_legal())
        .collect();

    let mut header = HeaderTable::new();
    for (name, entry) in master.header.iter() {
        header.push(name, entry.clone());
    }
    let mut info = master.info.clone();
    for (candidate, verdict) in &legal {
        let aliased = apply_alias_map(&candidate.header, verdict);
        for (name, entry) in aliased.iter() {
            header.push(name, entry.clone());
        }
        info = info.merged_with(&candidate.info);
    }

    let columns: Vec<String> = header.variables().map(|v| v.to_string()).collect();
    let mut table = master.table.projected(&columns);
    for (candidate, _) in &legal {
        table
            .rows
            .extend(candidate.table.projected(&columns).rows);
    }
    // Stable sort: the master's rows keep precedence within a timestamp.
    table.sort_by_timestamp();

    let duplicate_mask = integrity::duplicate_records(&table);
    let duplicate_records_removed = duplicate_mask.iter().filter(|d| **d).count();
    if duplicate_records_removed > 0 {
        let mut keep = duplicate_mask.iter().map(|d| !*d);
        table.rows.retain(|_| keep.next().unwrap_or(true));
    }

    let duplicate_index_count = integrity::duplicate_indices(&table)
        .iter()
        .filter(|d| **d)
        .count();
    if duplicate_index_count > 0 {
        // Conflicting rows under one timestamp are kept, never resolved.
        warn!(
            "{} conflicting same-timestamp row(s) in merged output of {:?}; review before use",
            duplicate_index_count, master.path
        );
    }

    let mut result = ConcatenationResult {
        dialect: master.dialect,
        info,
        header,
        table,
        verdicts,
        duplicate_records_removed,
        duplicate_index_count,
        report_lines: Vec::new(),
    };
    let report_lines = report::concatenation_report(master, &result);
    result.report_lines = report_lines;

    info!(
        "Concatenated {} of {} candidate(s) into {:?}: {} row(s), {} duplicate(s) removed",
        result.merged_candidate_count(),
        candidates.len(),
        master.path,
        result.table.rows.len(),
        duplicate_records_removed
    );
    Ok(result)
}

/// Rewrites the candidate's units through the verdict's alias map so the
/// merged header carries the master's unit strings.
fn apply_alias_map(header: &HeaderTable, verdict: &MergeVerdict) -> HeaderTable {
    let mut aliased = header.clone();
    for (name, entry) in header.iter() {
        if let Some(master_unit) = verdict.alias_map.get(&entry.units) {
            aliased = aliased.with_units(name, master_unit);
        }
    }
    aliased
}
