//! Converter capability

use async_trait::async_trait;
use std::path::Path;

/// Trait for installer to wheel conversion
///
/// Implementations write the wheel for `installer` into `dest_dir`. The
/// pipeline decides beforehand whether conversion is needed; converters do not
/// check for an existing wheel themselves.
///
/// # Examples
///
/// ```no_run
/// use wheelwright::convert::{CliConverter, Converter};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let converter = CliConverter::from_path().expect("wheel not found in PATH");
/// converter
///     .convert(Path::new("installers/foo-1.0.win32.exe"), Path::new("wheels"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Converter: Send + Sync {
    /// Convert one installer into a wheel inside `dest_dir`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The installer cannot be read or is not a valid archive
    /// - The wheel cannot be written
    /// - The external tool fails to execute or exits unsuccessfully
    async fn convert(&self, installer: &Path, dest_dir: &Path) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
