// Error types for the library surface. The binary wraps these in
// `anyhow` with extra context; the sweeper turns `VisitError` into a
// per-entry outcome instead of propagating it.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong while uploading one file.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upload failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected upload response body: {0}")]
    InvalidBody(String),
    #[error("missing or malformed Date header: {0}")]
    InvalidDate(String),
}

/// Failures reading or writing the state file.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("state file {path} is empty or corrupted: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A keepalive request that did not come back with 200.
#[derive(Debug, Error)]
pub enum VisitError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status code {0}")]
    Status(StatusCode),
}
