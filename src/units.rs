//! Declared unit-alias relationships between known-equivalent unit strings.
//!
//! Aliasing is evaluated pairwise against the declared master unit only;
//! no transitive chaining across files is ever attempted.

/// Unit strings within one group are mutually equivalent.
const ALIAS_GROUPS: &[&[&str]] = &[
    // Degrees Celsius as written by logger programs vs. summary exports.
    &["Deg C", "C"],
    // Dimensionless counts.
    &["n", "arb", "samples"],
];

/// Outcome of comparing a candidate's declared unit against the master's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitMatch {
    Same,
    /// Equivalent by declared alias; the candidate's unit is renamed to the
    /// master's before merging.
    Alias,
    Mismatch,
}

pub fn reconcile(master_unit: &str, candidate_unit: &str) -> UnitMatch {
    if master_unit == candidate_unit {
        return UnitMatch::Same;
    }
    for group in ALIAS_GROUPS {
        if group.contains(&master_unit) && group.contains(&candidate_unit) {
            return UnitMatch::Alias;
        }
    }
    UnitMatch::Mismatch
}
