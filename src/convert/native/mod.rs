//! In-process conversion of eggs and wininst installers
//!
//! Both installer formats are zip archives (a wininst executable carries its
//! zip payload after the stub), so conversion is a member-by-member rewrite:
//! read every member, map it onto its wheel path, add the generated
//! `.dist-info` files and write the result with a `RECORD`.

mod egg;
mod metadata;
mod wininst;
mod writer;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use super::traits::Converter;
use crate::error::{ConversionError, Error, Result};
use crate::naming::{InstallerKind, WheelName, parse_installer_name};
use crate::store::temp_path_for;
use async_trait::async_trait;
use metadata::EggInfo;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use writer::WheelWriter;

/// Converter that rewrites installers into wheels without external tools
///
/// The wheel is named by [`derive_wheel_name`](crate::naming::derive_wheel_name),
/// so the file it produces is always the one the pipeline checks for.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeConverter;

#[async_trait]
impl Converter for NativeConverter {
    async fn convert(&self, installer: &Path, dest_dir: &Path) -> Result<()> {
        let installer = installer.to_path_buf();
        let dest_dir = dest_dir.to_path_buf();
        tokio::task::spawn_blocking(move || convert_installer(&installer, &dest_dir))
            .await
            .map_err(|e| Error::Other(format!("conversion task panicked: {}", e)))??;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "native"
    }
}

/// A file taken from the installer, keyed by its path in the wheel once laid out
struct Member {
    path: String,
    data: Vec<u8>,
}

/// Installer members mapped onto the wheel
struct Layout {
    files: Vec<Member>,
    info: EggInfo,
    root_is_purelib: bool,
}

impl Layout {
    fn new(root_is_purelib: bool) -> Self {
        Self {
            files: Vec::new(),
            info: EggInfo::default(),
            root_is_purelib,
        }
    }
}

/// Convert `installer` into a wheel inside `dest_dir`, returning the wheel path
///
/// Blocking; [`NativeConverter`] runs this on the blocking thread pool.
///
/// # Errors
///
/// - [`ConversionError::UnrecognizedInstaller`] when the filename does not parse
/// - [`ConversionError::InvalidArchive`] when the installer is not a readable zip
/// - [`Error::Io`] when the wheel cannot be written
pub fn convert_installer(installer: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let parsed = installer
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(parse_installer_name);
    let Some((kind, parsed)) = parsed else {
        return Err(ConversionError::UnrecognizedInstaller {
            installer: installer.to_path_buf(),
        }
        .into());
    };
    let wheel = WheelName::from_parsed(&parsed);

    let members = read_members(installer)?;
    debug!(
        installer = %installer.display(),
        members = members.len(),
        "installer read"
    );

    let layout = match kind {
        InstallerKind::Egg => egg::layout(members, &wheel),
        InstallerKind::Wininst => wininst::layout(members, &wheel),
    };

    let dest = dest_dir.join(wheel.file_name());
    let temp = temp_path_for(&dest);
    if let Err(e) = write_wheel(&temp, &wheel, layout) {
        let _ = std::fs::remove_file(&temp);
        return Err(e);
    }
    std::fs::rename(&temp, &dest).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to move '{}' into place: {}", temp.display(), e),
        ))
    })?;

    debug!(wheel = %dest.display(), "wheel written");
    Ok(dest)
}

fn read_members(installer: &Path) -> Result<Vec<Member>> {
    let file = File::open(installer).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to open '{}': {}", installer.display(), e),
        ))
    })?;

    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| invalid_archive(installer, format!("not a zip archive: {}", e)))?;

    let mut members = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| invalid_archive(installer, format!("failed to read entry {}: {}", i, e)))?;
        if entry.is_dir() {
            continue;
        }

        let Some(path) = entry
            .enclosed_name()
            .and_then(|p| p.to_str())
            .map(str::to_string)
        else {
            warn!(
                installer = %installer.display(),
                entry = entry.name(),
                "skipping entry with unsafe path"
            );
            continue;
        };

        let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry
            .read_to_end(&mut data)
            .map_err(|e| invalid_archive(installer, format!("failed to read '{}': {}", path, e)))?;
        members.push(Member { path, data });
    }

    Ok(members)
}

fn write_wheel(path: &Path, wheel: &WheelName, layout: Layout) -> Result<()> {
    let write_error = |e: zip::result::ZipError| {
        Error::Io(std::io::Error::other(format!(
            "Failed to write '{}': {}",
            path.display(),
            e
        )))
    };

    let file = File::create(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to create '{}': {}", path.display(), e),
        ))
    })?;
    let mut writer = WheelWriter::new(BufWriter::new(file));

    // Generated dist-info files take precedence over shipped ones
    let dist_info = format!("{}.dist-info", wheel.distribution());
    let record_path = format!("{dist_info}/RECORD");
    writer.reserve(&record_path);
    for (name, data) in layout.info.dist_info_files(wheel) {
        writer
            .add(&format!("{dist_info}/{name}"), &data)
            .map_err(write_error)?;
    }
    let wheel_file = metadata::wheel_file(wheel, layout.root_is_purelib);
    writer
        .add(&format!("{dist_info}/WHEEL"), wheel_file.as_bytes())
        .map_err(write_error)?;

    for member in &layout.files {
        if !writer.add(&member.path, &member.data).map_err(write_error)? {
            warn!(file = %member.path, "duplicate wheel member, keeping the first");
        }
    }

    let buffered = writer.finish(&record_path).map_err(write_error)?;
    let file = buffered.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    file.sync_all()?;
    Ok(())
}

fn invalid_archive(installer: &Path, reason: String) -> Error {
    ConversionError::InvalidArchive {
        installer: installer.to_path_buf(),
        reason,
    }
    .into()
}
