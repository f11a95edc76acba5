use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal import failures. Any of these aborts the import before the
/// destination file is touched.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read CSV file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV file is empty")]
    Empty,

    #[error("failed to tokenize line {line}: {source}")]
    Tokenize {
        line: usize,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize movies: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;
