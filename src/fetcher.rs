//! Streaming HTTP GET with bounded chunk reads.

use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, Url};
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::error::{Error, Result};

/// Upper bound on the size of a single chunk handed out by [`Body`].
pub const CHUNK_SIZE: usize = 4096;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default)]
pub struct FetcherOptions {
    /// Deadline for a whole request, body included. `None` waits forever.
    pub timeout: Option<Duration>,
}

/// Opens GET requests over one shared connection pool.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(options: &FetcherOptions) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().map_err(Error::Client)?,
        })
    }

    /// Sends the request and checks the status. The body is not read yet;
    /// a non-2xx response is rejected before any of it is consumed.
    pub async fn open(&self, url: &str) -> Result<Body> {
        let parsed = parse_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        debug!(url, %status, content_length = ?response.content_length(), "response opened");

        let stream = response.bytes_stream().map_err(io::Error::other).boxed();
        Ok(Body {
            url: url.to_string(),
            reader: StreamReader::new(stream),
            buf: vec![0; CHUNK_SIZE].into_boxed_slice(),
        })
    }
}

fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|err| Error::InvalidUrl {
        url: url.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme `{}`", other),
        }),
    }
}

/// An open response body. Owns the connection until dropped, whether the
/// body was read to the end or not.
pub struct Body {
    url: String,
    reader: StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>,
    buf: Box<[u8]>,
}

impl Body {
    /// Next chunk of at most [`CHUNK_SIZE`] bytes, or `None` once the body
    /// is exhausted. Chunks come back in the order the server sent them.
    pub async fn next_chunk(&mut self) -> Result<Option<&[u8]>> {
        let n = self
            .reader
            .read(&mut self.buf)
            .await
            .map_err(|source| Error::Body {
                url: self.url.clone(),
                source,
            })?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(&self.buf[..n]))
        }
    }
}
