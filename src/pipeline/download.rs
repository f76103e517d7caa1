//! Download phase

use super::Wheelwright;
use crate::error::Result;
use crate::types::{DownloadSummary, PackageSpec};
use tracing::{debug, error, info, warn};

impl Wheelwright {
    /// Download every accepted installer of every configured release
    ///
    /// Packages are processed in configuration order, each requested version
    /// in order (latest when none are pinned). Installers already in the
    /// store are not downloaded again.
    ///
    /// # Errors
    ///
    /// Without `keep_going` the first index error aborts the phase. With it,
    /// failed releases and failed files are logged and counted in
    /// [`DownloadSummary::failed`].
    pub async fn download_installers(&self, keep_going: bool) -> Result<DownloadSummary> {
        let mut summary = DownloadSummary::default();

        for package in &self.config.packages {
            for version in package.requested_versions() {
                let result = self
                    .download_release(package, version, keep_going, &mut summary)
                    .await;
                match result {
                    Ok(()) => {}
                    Err(e) if keep_going => {
                        error!(
                            package = %package.name,
                            version = version.unwrap_or("latest"),
                            error = %e,
                            "release failed, continuing"
                        );
                        summary.failed += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        info!(
            downloaded = summary.downloaded,
            already_present = summary.already_present,
            skipped = summary.skipped,
            failed = summary.failed,
            "download phase complete"
        );
        Ok(summary)
    }

    async fn download_release(
        &self,
        package: &PackageSpec,
        version: Option<&str>,
        keep_going: bool,
        summary: &mut DownloadSummary,
    ) -> Result<()> {
        let metadata = self.client.fetch_metadata(&package.name, version).await?;
        summary.metadata_fetches += 1;

        if let Some(release) = metadata.info.as_ref().and_then(|i| i.version.as_deref()) {
            debug!(package = %package.name, release, "resolved release");
        }

        for descriptor in metadata.installers_for(package) {
            let Some(dest) = self.installers.path_for(&descriptor.filename) else {
                warn!(
                    package = %package.name,
                    filename = %descriptor.filename,
                    "rejecting index filename that would escape the installer directory"
                );
                summary.skipped += 1;
                continue;
            };

            if self.installers.contains(&descriptor.filename).await {
                debug!(filename = %descriptor.filename, "already downloaded");
                summary.already_present += 1;
                continue;
            }

            match self.client.download(&descriptor.url, &dest).await {
                Ok(_) => summary.downloaded += 1,
                Err(e) if keep_going => {
                    error!(
                        filename = %descriptor.filename,
                        error = %e,
                        "download failed, continuing"
                    );
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}
