pub mod assess;
pub mod assess_cmd;
pub mod cli;
pub mod concat;
pub mod data;
pub mod dialect;
pub mod discover;
pub mod error;
pub mod inspect_cmd;
pub mod integrity;
pub mod io_utils;
pub mod merge_cmd;
pub mod reader;
pub mod report;
pub mod units;
pub mod writer;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("logmerge", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Merge(args) => merge_cmd::execute(&args),
        Commands::Inspect(args) => inspect_cmd::execute(&args),
        Commands::Assess(args) => assess_cmd::execute(&args),
    }
}
