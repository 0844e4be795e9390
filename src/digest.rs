//! Incremental SHA-256 over a byte stream of unknown length.

use sha2::{Digest, Sha256};

/// Running SHA-256 state for one resource. Memory use stays at one hash
/// block no matter how many bytes pass through.
#[derive(Default)]
pub struct DigestStream {
    hasher: Sha256,
    len: u64,
}

impl DigestStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.hasher.update(chunk);
        self.len += chunk.len() as u64;
    }

    pub fn bytes_hashed(&self) -> u64 {
        self.len
    }

    /// Lowercase hex digest of everything fed so far. Consumes the stream.
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}
