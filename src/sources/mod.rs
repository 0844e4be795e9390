mod executor;
mod resolver;
mod scanner;

pub use executor::{Executor, FailurePolicy};
pub use resolver::Resolver;
pub use scanner::Scanner;

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::Fetcher;
use crate::manifest::Manifest;

/// Scans the build log, hashes every jar it mentions and writes the sources
/// manifest. The output file is left alone unless every artifact resolved.
pub async fn generate(config: &Config) -> Result<Manifest> {
    let urls = Scanner::jars()?.scan_file(&config.input)?;
    info!(
        count = urls.len(),
        input = %config.input.display(),
        "collected artifact urls"
    );

    let fetcher = Fetcher::new(&config.fetcher_options())?;
    let executor = Executor::new(Resolver::new(fetcher), config.concurrency, config.policy);
    let manifest = executor.resolve_all(&urls).await?;

    manifest.save(&config.output)?;
    info!(
        entries = manifest.len(),
        output = %config.output.display(),
        "manifest written"
    );
    Ok(manifest)
}
