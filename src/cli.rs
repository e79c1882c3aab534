use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dialect::Dialect;

#[derive(Debug, Parser)]
#[command(author, version, about = "Audit and merge append-only data-logger time series files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge a master file with eligible candidate files into one series
    Merge(MergeArgs),
    /// Report structural integrity statistics for a single file
    Inspect(InspectArgs),
    /// Evaluate merge legality for a master/candidate pair
    Assess(AssessArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum DialectArg {
    LoggerTable,
    SummaryExport,
}

impl DialectArg {
    pub fn dialect(self) -> Dialect {
        match self {
            DialectArg::LoggerTable => Dialect::LoggerTable,
            DialectArg::SummaryExport => Dialect::SummaryExport,
        }
    }
}

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Master file (discovered from --directory if omitted)
    #[arg(short = 'i', long = "master")]
    pub master: Option<PathBuf>,
    /// Candidate files to assess (repeatable)
    #[arg(short = 'c', long = "candidate", action = clap::ArgAction::Append)]
    pub candidates: Vec<PathBuf>,
    /// Directory to search for candidates by naming convention
    #[arg(short = 'd', long = "directory")]
    pub directory: Option<PathBuf>,
    /// Merged output file ('-' for stdout; defaults next to the master)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Report file path (defaults next to the merged output)
    #[arg(long = "report")]
    pub report: Option<PathBuf>,
    /// Force a dialect instead of auto-detecting from the first line
    #[arg(long = "dialect", value_enum)]
    pub dialect: Option<DialectArg>,
    /// Character encoding of input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Input file to analyze
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Force a dialect instead of auto-detecting from the first line
    #[arg(long = "dialect", value_enum)]
    pub dialect: Option<DialectArg>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct AssessArgs {
    /// Master file
    #[arg(short = 'i', long = "master")]
    pub master: PathBuf,
    /// Candidate file
    #[arg(short = 'c', long = "candidate")]
    pub candidate: PathBuf,
    /// Force a dialect instead of auto-detecting from the first line
    #[arg(long = "dialect", value_enum)]
    pub dialect: Option<DialectArg>,
    /// Character encoding of input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit the verdict as JSON instead of a text block
    #[arg(long = "json")]
    pub json: bool,
}
