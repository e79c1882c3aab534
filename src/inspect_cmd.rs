use anyhow::{Context, Result};

use crate::{cli::InspectArgs, integrity, io_utils, reader, report};

pub fn execute(args: &InspectArgs) -> Result<()> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let handle = reader::read(&args.input, args.dialect.map(|d| d.dialect()), encoding)
        .with_context(|| format!("Reading {:?}", args.input))?;
    let summary = integrity::summarize(&handle);
    for line in report::integrity_block(&handle, &summary) {
        println!("{line}");
    }
    Ok(())
}
