use tracing::{debug, info};

use crate::digest::DigestStream;
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::manifest::ManifestEntry;

/// Downloads one artifact and turns it into a manifest entry.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Fetcher,
}

impl Resolver {
    pub fn new(fetcher: Fetcher) -> Self {
        Resolver { fetcher }
    }

    /// Streams `url` through a fresh digest. Any failure, including a body
    /// that ends early, is returned as is and no entry is produced.
    pub async fn resolve(&self, url: &str) -> Result<ManifestEntry> {
        info!(url, "started sha256");

        let mut body = self.fetcher.open(url).await?;
        let mut digest = DigestStream::new();
        while let Some(chunk) = body.next_chunk().await? {
            digest.update(chunk);
        }
        drop(body);

        let bytes = digest.bytes_hashed();
        let sha256 = digest.finalize();
        debug!(url, bytes, sha256 = sha256.as_str(), "digest finalized");
        info!(url, bytes, "done sha256");

        Ok(ManifestEntry::file(url, sha256))
    }
}
