use std::path::PathBuf;

use thiserror::Error;

/// Closed set of fatal failure kinds for the merge engine.
///
/// Everything recoverable (unparsable row timestamps, numeric coercion
/// failures, illegal-but-well-formed candidates) is reported through values,
/// not through this enum.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("unrecognized file dialect; first line begins with '{token}'")]
    UnknownDialect { token: String },

    #[error("input file not found: {path:?}")]
    FileNotFound { path: PathBuf },

    #[error("{path:?} is shorter than the {expected} header line(s) its dialect declares")]
    NoHeaderLines { path: PathBuf, expected: usize },

    #[error(
        "ambiguous sampling interval in {path:?}: minimum delta {minimum} min != modal delta {modal} min"
    )]
    AmbiguousInterval {
        path: PathBuf,
        minimum: i64,
        modal: i64,
    },

    #[error("master and candidate are the same file: {path:?}")]
    SelfMerge { path: PathBuf },

    #[error("{path:?} contains no usable data rows")]
    EmptyTable { path: PathBuf },

    #[error("CSV error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MergeError>;
