use anyhow::{Context, Result};

use crate::{assess, cli::AssessArgs, io_utils, reader, report};

pub fn execute(args: &AssessArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let dialect = args.dialect.map(|d| d.dialect());
    let master = reader::read(&args.master, dialect, encoding)
        .with_context(|| format!("Reading master {:?}", args.master))?;
    let candidate = reader::read(&args.candidate, Some(master.dialect), encoding)
        .with_context(|| format!("Reading candidate {:?}", args.candidate))?;

    let verdict = assess::assess(&master, &candidate)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        for line in report::verdict_block(&verdict) {
            println!("{line}");
        }
    }
    Ok(())
}
