use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::utils::multierr::MultiError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("reading body of {url} failed: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: StatusCode },

    #[error("{}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("manifest encoding error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid url pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("resolution task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("concurrency limiter closed: {0}")]
    Limiter(#[from] tokio::sync::AcquireError),

    #[error("{0}")]
    Batch(MultiError<Error>),
}

impl Error {
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Connection level failures, including a body that broke off mid-stream.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Body { .. })
    }

    pub fn is_http_status(&self) -> bool {
        matches!(self, Error::HttpStatus { .. })
    }

    pub fn is_filesystem(&self) -> bool {
        matches!(self, Error::Filesystem { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
