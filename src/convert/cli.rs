//! Converter backed by the external `wheel convert` command

use super::traits::Converter;
use crate::error::ConversionError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

/// Converter that runs `wheel convert -d <dest_dir> <installer>`
///
/// The output name is chosen by the external tool. For pure-Python wininst
/// installers it may differ from the name derived from the installer
/// filename, in which case the pipeline warns after conversion.
///
/// # Examples
///
/// ```no_run
/// use wheelwright::convert::CliConverter;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let converter = CliConverter::new(PathBuf::from("/usr/bin/wheel"));
///
/// // Or auto-discover from PATH
/// let converter = CliConverter::from_path().expect("wheel not found in PATH");
/// ```
pub struct CliConverter {
    binary_path: PathBuf,
}

impl CliConverter {
    /// Create a new CLI converter with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find `wheel` in PATH
    ///
    /// Returns `None` if the binary is not found.
    pub fn from_path() -> Option<Self> {
        which::which("wheel").ok().map(Self::new)
    }

    /// Path of the executable this converter runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }
}

#[async_trait]
impl Converter for CliConverter {
    async fn convert(&self, installer: &Path, dest_dir: &Path) -> crate::Result<()> {
        debug!(
            binary = %self.binary_path.display(),
            installer = %installer.display(),
            dest = %dest_dir.display(),
            "running wheel convert"
        );

        let output = Command::new(&self.binary_path)
            .arg("convert")
            .arg("-d")
            .arg(dest_dir)
            .arg(installer)
            .output()
            .await
            .map_err(|e| crate::Error::ExternalTool(format!("Failed to execute wheel: {}", e)))?;

        if !output.status.success() {
            return Err(ConversionError::ToolFailed {
                installer: installer.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            debug!(output = %stdout.trim(), "wheel convert output");
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "wheel-cli"
    }
}
