//! # wheelwright
//!
//! Fetches legacy Windows installers (`bdist_wininst`) and eggs
//! (`bdist_egg`) from a package index and converts them to wheels.
//!
//! ## Design
//!
//! - **Idempotent** - a file present under its final name is never fetched
//!   or converted again, so a run can be repeated or interrupted at any point
//! - **Atomic** - downloads and wheels are written to a `.tmp` name and
//!   renamed into place
//! - **Pluggable conversion** - an in-process converter, or the external
//!   `wheel convert` command
//!
//! ## Quick Start
//!
//! ```no_run
//! use wheelwright::{Config, RunOptions, Wheelwright};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("packages.toml"))?;
//!     let wheelwright = Wheelwright::new(config)?;
//!
//!     let summary = wheelwright.run(RunOptions::default()).await?;
//!     println!("{}", summary.conversion);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration loading
pub mod config;
/// Installer to wheel conversion
pub mod convert;
/// Error types
pub mod error;
/// Package index client
pub mod index;
/// Installer and wheel filename conventions
pub mod naming;
/// Download and conversion orchestration
pub mod pipeline;
/// Artifact directories
pub mod store;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{Config, ConverterKind, Settings};
pub use convert::{CliConverter, Converter, NativeConverter};
pub use error::{ConversionError, Error, IndexError, Result, ToExitCode};
pub use index::IndexClient;
pub use naming::{WheelName, derive_wheel_name};
pub use pipeline::Wheelwright;
pub use store::ArtifactStore;
pub use types::{
    ConversionSummary, DownloadSummary, IndexMetadata, InstallerDescriptor, PackageSpec,
    RunOptions, RunSummary,
};
