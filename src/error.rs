//! Error types for wheelwright
//!
//! This module provides the error handling for the crate:
//! - Domain-specific error types (index access, conversion)
//! - Exit status mapping for the command line front end
//! - Context information (URL, HTTP status, installer path)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wheelwright operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wheelwright
///
/// Every variant aborts the run when it reaches the top level. Unparseable
/// installer filenames are deliberately not represented here: they are
/// expected input and surface as `None` from the name deriver.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "packages")
        key: Option<String>,
    },

    /// Package index access failed (metadata lookup or file download)
    #[error("{0}")]
    Index(#[from] IndexError),

    /// Installer to wheel conversion failed
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool execution failed (wheel)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Run finished with failures while continuing past errors
    #[error("{failures} operation(s) failed, see log for details")]
    Incomplete {
        /// Number of packages or installers that failed
        failures: usize,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Package index errors
///
/// Metadata and download failures share one top-level kind ([`Error::Index`]);
/// the variants only shape the message.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Metadata endpoint returned a non-success status
    #[error("Failed to fetch {url}: {status} {reason}")]
    MetadataFetchFailed {
        /// The metadata URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
    },

    /// File endpoint returned a non-success status
    #[error("Failed to download {url}: {status} {reason}")]
    DownloadFailed {
        /// The file URL that was requested
        url: String,
        /// HTTP status code
        status: u16,
        /// HTTP reason phrase
        reason: String,
    },

    /// The request could not be sent or the body could not be read
    #[error("Failed to reach {url}: {reason}")]
    Unreachable {
        /// The URL that was requested
        url: String,
        /// Transport-level reason
        reason: String,
    },

    /// Metadata body was not the expected JSON document
    #[error("Invalid metadata from {url}: {reason}")]
    InvalidMetadata {
        /// The metadata URL that was requested
        url: String,
        /// Parse failure description
        reason: String,
    },
}

/// Conversion errors
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Installer filename does not follow a known convention
    #[error("cannot derive a wheel name for {installer}")]
    UnrecognizedInstaller {
        /// The installer that could not be named
        installer: PathBuf,
    },

    /// Installer payload could not be read as an archive
    #[error("invalid installer archive {installer}: {reason}")]
    InvalidArchive {
        /// The installer being converted
        installer: PathBuf,
        /// The reason the archive was rejected
        reason: String,
    },

    /// External converter exited unsuccessfully
    #[error("converter failed for {installer} (exit code {code:?}): {stderr}")]
    ToolFailed {
        /// The installer being converted
        installer: PathBuf,
        /// Process exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Captured standard error, trimmed
        stderr: String,
    },
}

/// Map errors to process exit statuses
///
/// Used by the command line front end to pick an exit code and to tag the
/// final log record with a machine-readable code.
pub trait ToExitCode {
    /// Process exit status for this error (never 0)
    fn exit_code(&self) -> u8;

    /// Machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> u8 {
        match self {
            Error::Config { .. } => 2,
            Error::Index(_) => 3,
            Error::Conversion(_) => 4,
            Error::ExternalTool(_) => 4,
            Error::NotSupported(_) => 4,
            Error::Io(_) => 5,
            Error::Incomplete { .. } => 6,
            Error::Other(_) => 1,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Index(e) => match e {
                IndexError::MetadataFetchFailed { .. } => "metadata_fetch_failed",
                IndexError::DownloadFailed { .. } => "download_failed",
                IndexError::Unreachable { .. } => "index_unreachable",
                IndexError::InvalidMetadata { .. } => "invalid_metadata",
            },
            Error::Conversion(e) => match e {
                ConversionError::UnrecognizedInstaller { .. } => "unrecognized_installer",
                ConversionError::InvalidArchive { .. } => "invalid_archive",
                ConversionError::ToolFailed { .. } => "converter_failed",
            },
            Error::Io(_) => "io_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::NotSupported(_) => "not_supported",
            Error::Incomplete { .. } => "incomplete",
            Error::Other(_) => "internal_error",
        }
    }
}
