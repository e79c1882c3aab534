mod common;

use common::{TestWorkspace, as_row_refs, hourly_rows, logger_table, summary_export};
use encoding_rs::UTF_8;
use logmerge::{concat, data::format_timestamp, error::MergeError, reader};

fn read(path: &std::path::Path) -> logmerge::data::FileHandle {
    reader::read(path, None, UTF_8).expect("read fixture")
}

#[test]
fn overlapping_candidate_extends_master_span() {
    let ws = TestWorkspace::new();
    let master_rows = hourly_rows(1, 5);
    let candidate_rows = hourly_rows(3, 5); // days 3-7
    let variables = [("AirTemp", "Deg C", "Avg")];
    let master_path = ws.write(
        "station.dat",
        &logger_table("S7", &variables, &as_row_refs(&master_rows)),
    );
    let candidate_path = ws.write(
        "station.backup",
        &logger_table("S7", &variables, &as_row_refs(&candidate_rows)),
    );

    let master = read(&master_path);
    let candidate = read(&candidate_path);
    let result = concat::concatenate(&master, &[candidate]).unwrap();

    assert_eq!(result.merged_candidate_count(), 1);
    assert!(result.verdicts[0].is_legal());
    assert_eq!(
        format_timestamp(result.table.first_timestamp().unwrap()),
        "2024-01-01 00:00:00"
    );
    assert_eq!(
        format_timestamp(result.table.last_timestamp().unwrap()),
        "2024-01-07 23:00:00"
    );
    // 7 days of hourly records, overlap deduplicated.
    assert_eq!(result.table.rows.len(), 7 * 24);
    assert_eq!(result.duplicate_records_removed, 3 * 24);
}

#[test]
fn interval_mismatch_excludes_candidate_and_reports_it() {
    let ws = TestWorkspace::new();
    let variables = [("AirTemp", "Deg C")];
    let master_path = ws.write(
        "met_summary.txt",
        &summary_export(
            &variables,
            &[
                ("2024-01-01", "00:00:00", vec!["1.0"]),
                ("2024-01-01", "00:30:00", vec!["1.1"]),
                ("2024-01-01", "01:00:00", vec!["1.2"]),
            ],
        ),
    );
    let candidate_path = ws.write(
        "met_summary_rotated.txt",
        &summary_export(
            &variables,
            &[
                ("2024-01-02", "00:00:00", vec!["2.0"]),
                ("2024-01-02", "00:15:00", vec!["2.1"]),
                ("2024-01-02", "00:30:00", vec!["2.2"]),
            ],
        ),
    );

    let master = read(&master_path);
    let candidate = read(&candidate_path);
    assert_eq!(master.base_interval_minutes, 30);
    assert_eq!(candidate.base_interval_minutes, 15);

    let result = concat::concatenate(&master, &[candidate]).unwrap();
    assert_eq!(result.merged_candidate_count(), 0);
    assert_eq!(result.table, master.table);
    let report = result.report_text();
    assert!(report.contains("interval_merge_legal: false"));
    assert!(report.contains("no eligible files found"));
}

#[test]
fn celsius_alias_merges_and_keeps_master_units() {
    let ws = TestWorkspace::new();
    let master_path = ws.write(
        "station.dat",
        &logger_table(
            "S7",
            &[("AirTemp", "Deg C", "Avg")],
            &as_row_refs(&hourly_rows(1, 1)),
        ),
    );
    let candidate_path = ws.write(
        "station.backup",
        &logger_table(
            "S7",
            &[("AirTemp", "C", "Avg")],
            &as_row_refs(&hourly_rows(2, 1)),
        ),
    );

    let master = read(&master_path);
    let candidate = read(&candidate_path);
    let result = concat::concatenate(&master, &[candidate]).unwrap();

    assert_eq!(result.merged_candidate_count(), 1);
    assert!(result.verdicts[0].unit_merge_legal);
    assert_eq!(
        result.verdicts[0].alias_map.get("C"),
        Some(&"Deg C".to_string())
    );
    assert_eq!(result.header.get("AirTemp").unwrap().units, "Deg C");
}

#[test]
fn unrelated_units_exclude_the_whole_candidate() {
    let ws = TestWorkspace::new();
    let master_path = ws.write(
        "station.dat",
        &logger_table(
            "S7",
            &[("BattV", "millivolts", "Min"), ("AirTemp", "Deg C", "Avg")],
            &[
                ("2024-01-01 00:00:00", vec!["12400", "3.5"]),
                ("2024-01-01 01:00:00", vec!["12300", "3.6"]),
            ],
        ),
    );
    let candidate_path = ws.write(
        "station.backup",
        &logger_table(
            "S7",
            &[("BattV", "volts", "Min"), ("AirTemp", "Deg C", "Avg")],
            &[
                ("2024-01-02 00:00:00", vec!["12.4", "4.5"]),
                ("2024-01-02 01:00:00", vec!["12.3", "4.6"]),
            ],
        ),
    );

    let master = read(&master_path);
    let candidate = read(&candidate_path);
    let result = concat::concatenate(&master, &[candidate]).unwrap();

    assert_eq!(result.merged_candidate_count(), 0);
    assert!(!result.verdicts[0].unit_merge_legal);
    assert_eq!(
        result.verdicts[0].mismatched_unit_variables,
        vec!["BattV".to_string()]
    );
    assert!(result.report_text().contains("mismatched units: BattV"));
}

#[test]
fn truncated_final_timestamp_is_dropped_and_counted() {
    let ws = TestWorkspace::new();
    let mut content = logger_table(
        "S7",
        &[("AirTemp", "Deg C", "Avg")],
        &[
            ("2024-01-01 00:00:00", vec!["3.5"]),
            ("2024-01-01 01:00:00", vec!["3.6"]),
            ("2024-01-01 02:00:00", vec!["3.7"]),
        ],
    );
    // Power loss mid-write: the last row's timestamp is truncated.
    content.push_str("\n\"2024-01-01 03:\",\"3.8\"");
    let path = ws.write("station.dat", &content);

    let handle = read(&path);
    assert_eq!(handle.dropped_rows, 1);
    assert_eq!(handle.table.rows.len(), 3);
    assert_eq!(handle.base_interval_minutes, 60);
    assert_eq!(handle.header.get("AirTemp").unwrap().units, "Deg C");
}

#[test]
fn alias_renames_never_chain_through_other_candidates() {
    // Master declares millivolts; one candidate declares "Deg C" and another
    // "C". The two candidates alias each other, but neither aliases the
    // master, so both must be excluded on their own merits.
    let ws = TestWorkspace::new();
    let master_path = ws.write(
        "station.dat",
        &logger_table(
            "S7",
            &[("X", "millivolts", "Smp")],
            &as_row_refs(&hourly_rows(1, 1)),
        ),
    );
    let c1_path = ws.write(
        "station_a.backup",
        &logger_table("S7", &[("X", "Deg C", "Smp")], &as_row_refs(&hourly_rows(2, 1))),
    );
    let c2_path = ws.write(
        "station_b.backup",
        &logger_table("S7", &[("X", "C", "Smp")], &as_row_refs(&hourly_rows(3, 1))),
    );

    let master = read(&master_path);
    let candidates = vec![read(&c1_path), read(&c2_path)];
    let result = concat::concatenate(&master, &candidates).unwrap();

    assert_eq!(result.merged_candidate_count(), 0);
    for verdict in &result.verdicts {
        assert!(!verdict.unit_merge_legal);
        assert!(verdict.alias_map.is_empty());
    }
    assert_eq!(result.header.get("X").unwrap().units, "millivolts");
}

#[test]
fn repeated_concatenation_is_byte_identical() {
    let ws = TestWorkspace::new();
    let variables = [("AirTemp", "Deg C", "Avg")];
    let master_path = ws.write(
        "station.dat",
        &logger_table("S7", &variables, &as_row_refs(&hourly_rows(1, 2))),
    );
    let candidate_path = ws.write(
        "station.backup",
        &logger_table("S7", &variables, &as_row_refs(&hourly_rows(2, 2))),
    );

    let master = read(&master_path);
    let candidate = read(&candidate_path);
    let first = concat::concatenate(&master, std::slice::from_ref(&candidate)).unwrap();
    let second = concat::concatenate(&master, &[candidate]).unwrap();

    assert_eq!(first.table, second.table);
    assert_eq!(first.header, second.header);
    assert_eq!(first.report_lines, second.report_lines);
}

#[test]
fn conflicting_rows_are_surfaced_not_resolved() {
    let ws = TestWorkspace::new();
    let master_path = ws.write(
        "station.dat",
        &logger_table(
            "S7",
            &[("AirTemp", "Deg C", "Avg")],
            &[
                ("2024-01-01 00:00:00", vec!["3.5"]),
                ("2024-01-01 01:00:00", vec!["3.6"]),
            ],
        ),
    );
    let candidate_path = ws.write(
        "station.backup",
        &logger_table(
            "S7",
            &[("AirTemp", "Deg C", "Avg")],
            &[
                ("2024-01-01 01:00:00", vec!["9.9"]),
                ("2024-01-01 02:00:00", vec!["3.7"]),
            ],
        ),
    );

    let master = read(&master_path);
    let candidate = read(&candidate_path);
    let result = concat::concatenate(&master, &[candidate]).unwrap();

    assert_eq!(result.duplicate_index_count, 1);
    // Both conflicting rows survive in the merged table.
    assert_eq!(result.table.rows.len(), 4);
}

#[test]
fn ambiguous_interval_aborts_the_read() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "station.dat",
        &logger_table(
            "S7",
            &[("AirTemp", "Deg C", "Avg")],
            &[
                ("2024-01-01 00:00:00", vec!["1"]),
                ("2024-01-01 00:15:00", vec!["2"]),
                ("2024-01-01 00:45:00", vec!["3"]),
                ("2024-01-01 01:15:00", vec!["4"]),
                ("2024-01-01 01:45:00", vec!["5"]),
            ],
        ),
    );
    let err = reader::read(&path, None, UTF_8).unwrap_err();
    assert!(matches!(
        err,
        MergeError::AmbiguousInterval {
            minimum: 15,
            modal: 30,
            ..
        }
    ));
}

#[test]
fn self_merge_is_rejected() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "station.dat",
        &logger_table(
            "S7",
            &[("AirTemp", "Deg C", "Avg")],
            &as_row_refs(&hourly_rows(1, 1)),
        ),
    );
    let master = read(&path);
    let err = concat::concatenate(&master, std::slice::from_ref(&master)).unwrap_err();
    assert!(matches!(err, MergeError::SelfMerge { .. }));
}
