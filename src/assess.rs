//! Merge legality assessment for a master/candidate pair.
//!
//! Four independent predicates (date, interval, variable, unit) decide
//! whether a candidate may be merged. Illegality is an expected outcome
//! carried in the verdict value; only a self-merge is an error.

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::debug;
use serde::Serialize;

use crate::{
    data::FileHandle,
    error::{MergeError, Result},
    units::{self, UnitMatch},
};

/// Structured outcome of assessing one candidate against the master.
#[derive(Debug, Clone, Serialize)]
pub struct MergeVerdict {
    pub master: PathBuf,
    pub candidate: PathBuf,
    pub candidate_span: Option<(NaiveDateTime, NaiveDateTime)>,
    pub date_merge_legal: bool,
    pub interval_merge_legal: bool,
    pub variable_merge_legal: bool,
    pub unit_merge_legal: bool,
    pub master_only_variables: Vec<String>,
    pub candidate_only_variables: Vec<String>,
    pub mismatched_unit_variables: Vec<String>,
    /// Candidate unit -> master unit, for variables whose differing units
    /// are declared equivalent. Applied to the candidate before merging.
    pub alias_map: BTreeMap<String, String>,
}

impl MergeVerdict {
    /// Overall legality: every predicate must hold.
    pub fn is_legal(&self) -> bool {
        self.date_merge_legal
            && self.interval_merge_legal
            && self.variable_merge_legal
            && self.unit_merge_legal
    }
}

pub fn assess(master: &FileHandle, candidate: &FileHandle) -> Result<MergeVerdict> {
    if master.path == candidate.path {
        return Err(MergeError::SelfMerge {
            path: master.path.clone(),
        });
    }

    // Date legality: the candidate must contribute at least one timestamp
    // the master lacks; a zero-contribution merge could mask a stale backup.
    let master_stamps: HashSet<NaiveDateTime> = master.table.timestamps().collect();
    let date_merge_legal = candidate
        .table
        .timestamps()
        .any(|ts| !master_stamps.contains(&ts));

    let interval_merge_legal = master.base_interval_minutes == candidate.base_interval_minutes;

    let master_vars: Vec<&str> = master.header.variables().collect();
    let candidate_vars: Vec<&str> = candidate.header.variables().collect();
    let candidate_set: HashSet<&str> = candidate_vars.iter().copied().collect();
    let master_set: HashSet<&str> = master_vars.iter().copied().collect();

    let shared: Vec<&str> = master_vars
        .iter()
        .copied()
        .filter(|v| candidate_set.contains(v))
        .collect();
    let master_only_variables: Vec<String> = master_vars
        .iter()
        .filter(|v| !candidate_set.contains(**v))
        .map(|v| v.to_string())
        .collect();
    let candidate_only_variables: Vec<String> = candidate_vars
        .iter()
        .filter(|v| !master_set.contains(**v))
        .map(|v| v.to_string())
        .collect();

    // Mismatched variable sets are expected (loggers get reconfigured); only
    // the absence of any common variable disqualifies.
    let variable_merge_legal = !shared.is_empty();

    let mut unit_merge_legal = true;
    let mut mismatched_unit_variables = Vec::new();
    let mut alias_map = BTreeMap::new();
    for variable in &shared {
        let (Some(master_entry), Some(candidate_entry)) =
            (master.header.get(variable), candidate.header.get(variable))
        else {
            continue;
        };
        match units::reconcile(&master_entry.units, &candidate_entry.units) {
            UnitMatch::Same => {}
            UnitMatch::Alias => {
                alias_map.insert(candidate_entry.units.clone(), master_entry.units.clone());
            }
            UnitMatch::Mismatch => {
                // One bad unit fails the whole candidate; partial merges
                // would leave column provenance ambiguous.
                mismatched_unit_variables.push(variable.to_string());
                unit_merge_legal = false;
            }
        }
    }

    debug!(
        "Assessed {:?} against {:?}: date={} interval={} variable={} unit={}",
        candidate.path,
        master.path,
        date_merge_legal,
        interval_merge_legal,
        variable_merge_legal,
        unit_merge_legal
    );

    Ok(MergeVerdict {
        master: master.path.clone(),
        candidate: candidate.path.clone(),
        candidate_span: candidate.date_span(),
        date_merge_legal,
        interval_merge_legal,
        variable_merge_legal,
        unit_merge_legal,
        master_only_variables,
        candidate_only_variables,
        mismatched_unit_variables,
        alias_map,
    })
}
