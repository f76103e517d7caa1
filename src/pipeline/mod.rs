//! Run orchestration
//!
//! [`Wheelwright`] owns everything a run needs and drives the two phases:
//! - [`download`] - fetch installers listed by the index into the installer store
//! - [`convert`] - convert every stored installer that has no wheel yet
//!
//! Both phases are idempotent: the presence of a file under its final name is
//! the only state carried between runs.

mod convert;
mod download;


use crate::config::Config;
use crate::convert::{Converter, converter_from_settings};
use crate::error::{Error, Result};
use crate::index::IndexClient;
use crate::store::ArtifactStore;
use crate::types::{RunOptions, RunSummary};
use std::sync::Arc;
use tracing::info;

/// Fetches installers and converts them to wheels
#[derive(Clone)]
pub struct Wheelwright {
    /// Configuration the run was created from
    pub(crate) config: Arc<Config>,
    /// Package index client
    pub(crate) client: IndexClient,
    /// Conversion backend (trait object for pluggable implementations)
    pub(crate) converter: Arc<dyn Converter>,
    /// Downloaded installers
    pub(crate) installers: ArtifactStore,
    /// Converted wheels
    pub(crate) wheels: ArtifactStore,
}

impl Wheelwright {
    /// Create a run with the converter selected by the configuration
    pub fn new(config: Config) -> Result<Self> {
        let converter = converter_from_settings(&config.settings)?;
        Self::with_converter(config, converter)
    }

    /// Create a run with an explicit converter
    pub fn with_converter(config: Config, converter: Arc<dyn Converter>) -> Result<Self> {
        let client = IndexClient::from_settings(&config.settings)?;
        let installers = ArtifactStore::new(config.installer_dir());
        let wheels = ArtifactStore::new(config.wheel_dir());

        info!(
            packages = config.packages.len(),
            index = %client.base_url(),
            converter = converter.name(),
            "wheelwright initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            client,
            converter,
            installers,
            wheels,
        })
    }

    /// Configuration of this run
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Installer store
    pub fn installers(&self) -> &ArtifactStore {
        &self.installers
    }

    /// Wheel store
    pub fn wheels(&self) -> &ArtifactStore {
        &self.wheels
    }

    /// Run the download phase (unless skipped), then the conversion phase
    ///
    /// Both store directories are created when absent. With `keep_going`,
    /// failures are counted instead of aborting and a run with any failure
    /// ends in [`Error::Incomplete`].
    pub async fn run(&self, options: RunOptions) -> Result<RunSummary> {
        self.installers.ensure_exists().await?;

        let download = if options.skip_download {
            info!("skipping download phase");
            None
        } else {
            Some(self.download_installers(options.keep_going).await?)
        };

        self.wheels.ensure_exists().await?;
        let conversion = self.create_wheels(options.keep_going).await?;

        let summary = RunSummary {
            download,
            conversion,
        };
        match summary.failures() {
            0 => Ok(summary),
            failures => Err(Error::Incomplete { failures }),
        }
    }
}
