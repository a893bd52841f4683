use std::path::PathBuf;

use thiserror::Error;

/// Fatal export failures. Capture misses are not errors and never appear here.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read export config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse export config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid export config {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },
}
