//! Core types shared by the index client, the stores and the pipeline

use crate::naming::InstallerKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Format tag accepted when a package does not configure `formats`
pub const DEFAULT_FORMAT: &str = InstallerKind::Wininst.package_type();

/// One configured package
///
/// Loaded once from configuration and immutable for the run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    /// Package name as known to the index
    pub name: String,
    /// Versions to fetch, in order (empty = latest only)
    pub versions: Vec<String>,
    /// Accepted `packagetype` tags (never empty)
    pub formats: BTreeSet<String>,
}

impl PackageSpec {
    /// Package with no pinned versions and the default format
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            versions: Vec::new(),
            formats: BTreeSet::from([DEFAULT_FORMAT.to_string()]),
        }
    }

    /// Pin the versions to fetch
    #[must_use]
    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = versions.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the accepted formats; an empty set keeps the default
    #[must_use]
    pub fn with_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let formats: BTreeSet<String> = formats.into_iter().map(Into::into).collect();
        if !formats.is_empty() {
            self.formats = formats;
        }
        self
    }

    /// Versions to query: each pinned version, or `None` for latest
    pub fn requested_versions(&self) -> Vec<Option<&str>> {
        if self.versions.is_empty() {
            vec![None]
        } else {
            self.versions.iter().map(|v| Some(v.as_str())).collect()
        }
    }

    /// Whether an index file of this `packagetype` should be downloaded
    #[must_use]
    pub fn accepts(&self, packagetype: &str) -> bool {
        self.formats.contains(packagetype)
    }
}

/// A downloadable file listed by the index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerDescriptor {
    /// Absolute download URL
    pub url: String,
    /// Original filename, used as the store key
    pub filename: String,
    /// Format tag (e.g. `bdist_wininst`, `bdist_egg`, `sdist`)
    pub packagetype: String,
}

/// Subset of the index JSON document that wheelwright reads
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Project information, used for logging only
    #[serde(default)]
    pub info: Option<ProjectInfo>,
    /// Files of the requested release
    pub urls: Vec<InstallerDescriptor>,
}

/// Project information block of the index JSON document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project name
    #[serde(default)]
    pub name: Option<String>,
    /// Release version the document describes
    #[serde(default)]
    pub version: Option<String>,
}

impl IndexMetadata {
    /// Files whose `packagetype` the package accepts, in index order
    pub fn installers_for<'a>(
        &'a self,
        package: &'a PackageSpec,
    ) -> impl Iterator<Item = &'a InstallerDescriptor> + 'a {
        self.urls.iter().filter(|d| package.accepts(&d.packagetype))
    }
}

/// Options for a full run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Skip the download phase and only convert installers already present
    pub skip_download: bool,
    /// Log failures and continue instead of aborting on the first one
    pub keep_going: bool,
}

/// Outcome of the download phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Metadata documents fetched
    pub metadata_fetches: usize,
    /// Installers downloaded in this run
    pub downloaded: usize,
    /// Installers already in the store
    pub already_present: usize,
    /// Index entries rejected (unsafe filenames)
    pub skipped: usize,
    /// Packages or files that failed (only with `keep_going`)
    pub failed: usize,
}

/// Outcome of the conversion phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Wheels created in this run
    pub created: usize,
    /// Installers whose wheel already existed
    pub already_converted: usize,
    /// Installers whose filename could not be parsed
    pub skipped: usize,
    /// Conversions that failed (only with `keep_going`)
    pub failed: usize,
}

/// Outcome of a full run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Download phase outcome, `None` when the phase was skipped
    pub download: Option<DownloadSummary>,
    /// Conversion phase outcome
    pub conversion: ConversionSummary,
}

impl RunSummary {
    /// Failures counted across both phases
    #[must_use]
    pub fn failures(&self) -> usize {
        self.download.map_or(0, |d| d.failed) + self.conversion.failed
    }
}

impl fmt::Display for ConversionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.created == 0 {
            write!(f, "Nothing to do")
        } else {
            write!(f, "Created {} wheel(s)", self.created)
        }
    }
}
