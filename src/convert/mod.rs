//! Installer to wheel conversion
//!
//! The core abstraction is the [`Converter`] trait: given an installer path and
//! a destination directory, produce the wheel in that directory. Two
//! implementations are provided:
//!
//! - [`NativeConverter`]: converts eggs and wininst installers in-process
//! - [`CliConverter`]: runs the external `wheel convert` command
//!
//! ## Usage
//!
//! ```no_run
//! use wheelwright::convert::{Converter, NativeConverter};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = NativeConverter;
//!     converter
//!         .convert(
//!             Path::new("installers/ZODB3-3.10.5-py2.7-win-amd64.egg"),
//!             Path::new("wheels"),
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

mod cli;
mod native;
mod traits;

pub use cli::CliConverter;
pub use native::{NativeConverter, convert_installer};
pub use traits::Converter;

use crate::config::{ConverterKind, Settings};
use crate::error::{Error, Result};
use std::sync::Arc;

/// Build the converter selected by the run settings
///
/// For the external converter an explicit `wheel-path` wins; otherwise `wheel`
/// is searched in `PATH`, and its absence is reported up front rather than on
/// the first installer.
pub fn converter_from_settings(settings: &Settings) -> Result<Arc<dyn Converter>> {
    let converter: Arc<dyn Converter> = match settings.converter {
        ConverterKind::Native => Arc::new(NativeConverter),
        ConverterKind::Wheel => match &settings.wheel_path {
            Some(path) => Arc::new(CliConverter::new(path.clone())),
            None => Arc::new(CliConverter::from_path().ok_or_else(|| {
                Error::NotSupported(
                    "converter = \"wheel\" requires the wheel executable. \
                     Configure wheel-path or ensure wheel is in PATH."
                        .into(),
                )
            })?),
        },
    };

    tracing::debug!(converter = converter.name(), "converter selected");
    Ok(converter)
}
