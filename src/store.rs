//! On-disk artifact directories
//!
//! Both the installer store and the wheel output directory are plain
//! directories keyed by filename. A file's presence is the only state: an
//! installer present under its final name was downloaded completely, a wheel
//! present under its derived name was converted completely. Writers always
//! go through a temporary name and rename into place.

use crate::error::{Error, Result};
use crate::naming::InstallerKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix appended to filenames while they are being written
pub const TEMP_SUFFIX: &str = ".tmp";

/// A directory of artifacts keyed by filename
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Store rooted at `dir` (not created until [`ensure_exists`](Self::ensure_exists))
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store root
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory (and parents) if absent
    pub async fn ensure_exists(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create directory '{}': {}",
                    self.dir.display(),
                    e
                ),
            ))
        })
    }

    /// Path of `filename` inside the store, or `None` if the name would escape it
    ///
    /// Names from the index are untrusted: anything with a path separator,
    /// a parent reference, or no content is rejected.
    #[must_use]
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        if is_plain_filename(filename) {
            Some(self.dir.join(filename))
        } else {
            None
        }
    }

    /// Whether `filename` is present in the store
    pub async fn contains(&self, filename: &str) -> bool {
        match self.path_for(filename) {
            Some(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            None => false,
        }
    }

    /// Installer files in the store, sorted by filename
    ///
    /// Only regular files with a recognized installer extension are listed;
    /// other entries (including in-progress `.tmp` downloads) are skipped.
    pub async fn list_installers(&self) -> Result<Vec<PathBuf>> {
        debug!(dir = %self.dir.display(), "listing installers");

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read directory '{}': {}", self.dir.display(), e),
            ))
        })?;

        let mut installers = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            // follows symlinks
            let is_file = tokio::fs::metadata(&path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!(path = %path.display(), "skipping non-UTF-8 filename");
                continue;
            };

            if InstallerKind::from_filename(name).is_some() {
                installers.push(path);
            } else {
                debug!(file = name, "ignoring non-installer file");
            }
        }

        installers.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("found {} installer(s)", installers.len());
        Ok(installers)
    }
}

/// Temporary path used while writing `path`
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '\0'])
}
