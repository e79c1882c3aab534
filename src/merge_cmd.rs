use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::MergeArgs,
    concat,
    data::FileHandle,
    dialect::Dialect,
    discover, io_utils, reader, writer,
};

pub fn execute(args: &MergeArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dialect = args.dialect.map(|d| d.dialect());

    let (master, candidate_paths) = resolve_inputs(args, dialect)?;

    let mut candidates: Vec<FileHandle> = Vec::with_capacity(candidate_paths.len());
    for path in &candidate_paths {
        let handle = reader::read(path, Some(master.dialect), encoding)
            .with_context(|| format!("Reading candidate {path:?}"))?;
        candidates.push(handle);
    }

    let result = concat::concatenate(&master, &candidates)?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&master.path));
    let report = args
        .report
        .clone()
        .unwrap_or_else(|| default_report_path(&output, &master.path));

    if result.merged_candidate_count() == 0 {
        info!("No eligible files found; master carried through as the merged result");
    }
    writer::write_merged(&result, &output)?;
    info!("Wrote merged output to {:?}", output);
    io_utils::write_text(&report, &result.report_text())?;
    info!("Wrote report to {:?}", report);
    Ok(())
}

fn resolve_inputs(
    args: &MergeArgs,
    dialect: Option<Dialect>,
) -> Result<(FileHandle, Vec<PathBuf>)> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    match (&args.master, &args.directory) {
        (Some(master_path), directory) => {
            let master = reader::read(master_path, dialect, encoding)
                .with_context(|| format!("Reading master {master_path:?}"))?;
            let mut paths = args.candidates.clone();
            if let Some(directory) = directory {
                for discovered in discover::candidates_for(directory, master_path, master.dialect)? {
                    if !paths.contains(&discovered) {
                        paths.push(discovered);
                    }
                }
            }
            Ok((master, paths))
        }
        (None, Some(directory)) => {
            let convention = dialect.unwrap_or(Dialect::LoggerTable);
            let (master_path, mut paths) = discover::select_master(directory, convention)?;
            info!("Selected {:?} as master", master_path);
            let master = reader::read(&master_path, dialect, encoding)
                .with_context(|| format!("Reading master {master_path:?}"))?;
            for explicit in &args.candidates {
                if !paths.contains(explicit) {
                    paths.push(explicit.clone());
                }
            }
            Ok((master, paths))
        }
        (None, None) => Err(anyhow!(
            "Either a master file (--master) or a search directory (--directory) is required"
        )),
    }
}

/// `<master-stem>_merged.<master-extension>` next to the master.
fn default_output_path(master: &Path) -> PathBuf {
    let stem = master
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("master");
    let name = match master.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_merged.{ext}"),
        None => format!("{stem}_merged"),
    };
    master.with_file_name(name)
}

/// Next to the merged output, or next to the master when output is stdout.
fn default_report_path(output: &Path, master: &Path) -> PathBuf {
    let base = if io_utils::is_dash(output) { master } else { output };
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("merged");
    base.with_file_name(format!("{stem}_report.txt"))
}
