//! Error types for ncdu-bos

use std::io;

use thiserror::Error;

/// Failures raised while producing the object listing.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("BOS returned {status}: {code}: {message} (request id {request_id})")]
    Service {
        status: u16,
        code: String,
        message: String,
        request_id: String,
    },

    #[error("failed to decode listing response: {0}")]
    Decode(String),

    #[error("listing is truncated but the server gave no marker to continue from")]
    StalledPagination,

    #[error("invalid listing entry on line {line}: {source}")]
    Manifest {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read listing: {0}")]
    Io(#[from] io::Error),

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
}

/// Top-level error for an export run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to write output: {0}")]
    Sink(#[from] io::Error),

    #[error("listing is not sorted: '{current}' follows '{previous}'")]
    Unordered { previous: String, current: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
