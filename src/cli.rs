//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;
use wheelwright::RunOptions;
use wheelwright::config::DEFAULT_CONFIG_FILE;

/// wheelwright - convert legacy Windows installers and eggs to wheels
#[derive(Parser, Debug)]
#[command(name = "wheelwright")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch wininst installers and eggs from a package index and convert them to wheels")]
#[command(long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Only convert installers already downloaded
    #[arg(long)]
    pub no_download: bool,

    /// Log failures and continue with the next package or installer
    #[arg(long)]
    pub keep_going: bool,
}

impl Cli {
    /// Options for [`wheelwright::Wheelwright::run`]
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            skip_download: self.no_download,
            keep_going: self.keep_going,
        }
    }

    /// Default log filter when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "wheelwright=debug"
        } else {
            "wheelwright=info"
        }
    }
}
