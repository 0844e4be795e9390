//! Builds flatpak-builder `sources` manifests for the jars a Gradle build
//! downloaded: every jar url found in the build log is fetched, hashed with
//! SHA-256 while streaming and listed with its checksum.

pub mod config;
pub mod digest;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod manifest;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};
pub use sources::generate;
