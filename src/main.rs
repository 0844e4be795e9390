use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use jarsources::sources::FailurePolicy;
use jarsources::manifest::Manifest;
use jarsources::{Config, Result, generate, logging};

#[derive(Parser)]
#[command(name = "jarsources")]
#[command(about = "Generate flatpak-builder sources for the jars fetched in a Gradle log")]
#[command(version)]
struct Cli {
    #[arg(help = "The gradle log file")]
    input: PathBuf,
    #[arg(help = "The output JSON sources file")]
    output: PathBuf,
    #[arg(short, long, help = "Maximum downloads in flight", default_value = "16")]
    concurrency: NonZeroUsize,
    #[arg(short, long, value_name = "SECS", help = "Per-request timeout in seconds")]
    timeout: Option<u64>,
    #[arg(long, help = "Abort remaining downloads on the first failure")]
    fail_fast: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            input: self.input,
            output: self.output,
            concurrency: self.concurrency,
            timeout: self.timeout.map(Duration::from_secs),
            policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::SettleAll
            },
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = Cli::parse().into_config();
    logging::init();

    finish(generate(&config).await, &mut io::stderr())
}

// The diagnostic goes straight to stderr so it shows even with logging off.
fn finish(result: Result<Manifest>, stderr: &mut impl Write) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(?err, "generation failed");
            let _ = writeln!(stderr, "jarsources: {}", err);
            ExitCode::FAILURE
        }
    }
}
