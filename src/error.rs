use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failure reaching or decoding the resource backend.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("response correlated to request {got}, expected {expected}")]
    Correlation { expected: u64, got: u64 },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown cluster {0:?}")]
    InvalidCluster(String),
    #[error("unknown resource kind {0:?}")]
    UnknownKind(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
