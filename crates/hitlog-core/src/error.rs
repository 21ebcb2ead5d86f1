// Analyzer error type
// Only run-level failures live here; bad lines and bad timestamps are not errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("cannot read access log {path}: {source}")]
    AccessLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write table {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid utc offset '{0}' (expected UTC, Z, +HH:MM or -HHMM)")]
    InvalidOffset(String),
}
