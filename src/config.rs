use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetcher::FetcherOptions;
use crate::sources::FailurePolicy;

/// Everything one run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub concurrency: NonZeroUsize,
    pub timeout: Option<Duration>,
    pub policy: FailurePolicy,
}

impl Config {
    pub fn fetcher_options(&self) -> FetcherOptions {
        FetcherOptions {
            timeout: self.timeout,
        }
    }
}
