//! Plain-text report rendering.
//!
//! Every run that reaches assessment produces one of these, so operators can
//! see which candidate or variable caused an illegal verdict without
//! re-running with verbose flags.

use crate::{
    assess::MergeVerdict,
    concat::ConcatenationResult,
    data::{FileHandle, format_timestamp},
    integrity::IntegritySummary,
};

pub fn concatenation_report(master: &FileHandle, result: &ConcatenationResult) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Concatenation report for {:?}", master.path));
    lines.push(format!("Dialect: {}", master.dialect));
    lines.push(format!("Station: {}", master.info.station));
    if let Some((first, last)) = master.date_span() {
        lines.push(format!(
            "Master span: {} .. {}",
            format_timestamp(first),
            format_timestamp(last)
        ));
    }
    lines.push(format!(
        "Base interval: {} minute(s)",
        master.base_interval_minutes
    ));
    lines.push(String::new());

    if result.verdicts.is_empty() {
        lines.push("no eligible files found".to_string());
        return lines;
    }

    for verdict in &result.verdicts {
        lines.extend(verdict_block(verdict));
        lines.push(String::new());
    }

    let merged = result.merged_candidate_count();
    if merged == 0 {
        lines.push("no eligible files found".to_string());
    } else {
        lines.push(format!(
            "Merged {} candidate(s): {} row(s), {} duplicate record(s) removed, {} conflicting same-timestamp row(s) kept",
            merged,
            result.table.rows.len(),
            result.duplicate_records_removed,
            result.duplicate_index_count
        ));
    }
    lines
}

/// One block per candidate, naming every predicate verdict and its
/// supporting detail.
pub fn verdict_block(verdict: &MergeVerdict) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Candidate: {:?}", verdict.candidate));
    if let Some((first, last)) = verdict.candidate_span {
        lines.push(format!(
            "  span: {} .. {}",
            format_timestamp(first),
            format_timestamp(last)
        ));
    }
    lines.push(format!("  date_merge_legal: {}", verdict.date_merge_legal));
    lines.push(format!(
        "  interval_merge_legal: {}",
        verdict.interval_merge_legal
    ));
    lines.push(format!(
        "  variable_merge_legal: {}",
        verdict.variable_merge_legal
    ));
    lines.push(format!("  unit_merge_legal: {}", verdict.unit_merge_legal));
    lines.push(format!(
        "  verdict: {}",
        if verdict.is_legal() { "merge" } else { "exclude" }
    ));
    if !verdict.master_only_variables.is_empty() {
        lines.push(format!(
            "  master-only variables: {}",
            verdict.master_only_variables.join(", ")
        ));
    }
    if !verdict.candidate_only_variables.is_empty() {
        lines.push(format!(
            "  candidate-only variables: {}",
            verdict.candidate_only_variables.join(", ")
        ));
    }
    if !verdict.alias_map.is_empty() {
        let renames: Vec<String> = verdict
            .alias_map
            .iter()
            .map(|(from, to)| format!("{from} -> {to}"))
            .collect();
        lines.push(format!("  aliased units: {}", renames.join(", ")));
    }
    if !verdict.mismatched_unit_variables.is_empty() {
        lines.push(format!(
            "  mismatched units: {}",
            verdict.mismatched_unit_variables.join(", ")
        ));
    }
    lines
}

/// Integrity roll-up for one file, as printed by `inspect`.
pub fn integrity_block(handle: &FileHandle, summary: &IntegritySummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Integrity report for {:?}", handle.path));
    lines.push(format!("Dialect: {}", handle.dialect));
    lines.push(format!("Station: {}", handle.info.station));
    if let Some((first, last)) = handle.date_span() {
        lines.push(format!(
            "Span: {} .. {}",
            format_timestamp(first),
            format_timestamp(last)
        ));
    }
    lines.push(format!(
        "Base interval: {} minute(s)",
        summary.base_interval_minutes
    ));
    lines.push(format!(
        "Rows: {} ({} dropped for unparsable timestamps)",
        handle.table.rows.len(),
        summary.dropped_rows
    ));
    lines.push(format!(
        "Missing records: {} ({:.2}%)",
        summary.missing.count, summary.missing.percent
    ));
    lines.push(format!(
        "Duplicate records: {}",
        summary.duplicate_record_count
    ));
    lines.push(format!(
        "Conflicting same-timestamp rows: {}",
        summary.duplicate_index_count
    ));
    if summary.gap_distribution.is_empty() {
        lines.push("Gaps: none".to_string());
    } else {
        lines.push("Gaps (missing records x occurrences):".to_string());
        for (gap, count) in &summary.gap_distribution {
            lines.push(format!("  {gap} x {count}"));
        }
    }
    lines
}
