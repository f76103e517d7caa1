//! wheelwright command line entry point

mod cli;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use tracing::{debug, error};
use wheelwright::{Config, Result, RunSummary, ToExitCode, Wheelwright};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.default_log_filter());

    match run(&cli).await {
        Ok(summary) => {
            debug!(?summary, "run complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(code = e.error_code(), "run failed");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = Config::load(&cli.config)?;
    let wheelwright = Wheelwright::new(config)?;
    wheelwright.run(cli.run_options()).await
}

/// Human-readable logs on stdout; `RUST_LOG` overrides the default filter
fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}
