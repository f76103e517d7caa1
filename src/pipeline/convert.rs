//! Conversion phase

use super::Wheelwright;
use crate::error::Result;
use crate::naming::derive_wheel_name;
use crate::types::ConversionSummary;
use tracing::{debug, error, info, warn};

impl Wheelwright {
    /// Convert every stored installer whose wheel is not present yet
    ///
    /// Installers are visited in filename order. Names that do not derive a
    /// wheel name are skipped.
    ///
    /// # Errors
    ///
    /// Without `keep_going` the first conversion error aborts the phase. With
    /// it, failures are logged and counted in [`ConversionSummary::failed`].
    pub async fn create_wheels(&self, keep_going: bool) -> Result<ConversionSummary> {
        let mut summary = ConversionSummary::default();

        for installer in self.installers.list_installers().await? {
            let Some(filename) = installer.file_name().and_then(|n| n.to_str()) else {
                continue;
            };

            let Some(wheel) = derive_wheel_name(filename) else {
                debug!(installer = filename, "no wheel name for installer, skipping");
                summary.skipped += 1;
                continue;
            };
            let wheel_name = wheel.file_name();

            if self.wheels.contains(&wheel_name).await {
                debug!(installer = filename, wheel = %wheel_name, "already converted");
                summary.already_converted += 1;
                continue;
            }

            info!("Converting {} to {}", filename, wheel_name);
            match self.converter.convert(&installer, self.wheels.dir()).await {
                Ok(()) => {
                    summary.created += 1;
                    if !self.wheels.contains(&wheel_name).await {
                        warn!(
                            installer = filename,
                            expected = %wheel_name,
                            converter = self.converter.name(),
                            "expected wheel not found after conversion; it will be converted again"
                        );
                    }
                }
                Err(e) if keep_going => {
                    error!(installer = filename, error = %e, "conversion failed, continuing");
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }

        info!("{}", summary);
        Ok(summary)
    }
}
