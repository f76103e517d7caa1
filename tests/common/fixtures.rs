//! Installer fixtures and configuration files

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Zip archive bytes containing the given members
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A platform-specific egg for ZODB3 3.10.5
pub fn zodb_egg() -> Vec<u8> {
    zip_bytes(&[
        ("ZODB/__init__.py", b"# ZODB\n"),
        ("persistent/_persistence.pyd", b"\x00\x01"),
        (
            "EGG-INFO/PKG-INFO",
            b"Metadata-Version: 1.1\nName: ZODB3\nVersion: 3.10.5\n",
        ),
        ("EGG-INFO/requires.txt", b"transaction>=1.1.0\nzc.lockfile\n"),
        ("EGG-INFO/top_level.txt", b"ZODB\npersistent\n"),
    ])
}

/// A wininst executable: stub followed by a zip payload
pub fn wininst(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut bytes = b"MZ\x90\x00".to_vec();
    bytes.extend_from_slice(&[0u8; 1024]);
    bytes.extend_from_slice(&zip_bytes(files));
    bytes
}

/// A pure-Python wininst installer for zope.interface 4.0.5
pub fn zope_interface_wininst() -> Vec<u8> {
    wininst(&[
        ("PURELIB/zope/interface/__init__.py", b"# zope.interface\n"),
        (
            "PURELIB/zope.interface-4.0.5-py2.7.egg-info/PKG-INFO",
            b"Metadata-Version: 1.1\nName: zope.interface\nVersion: 4.0.5\n",
        ),
    ])
}

/// Write `packages.toml` into `dir` with the directories inside `dir`
pub fn write_config(dir: &Path, index_url: &str, packages_body: &str) -> PathBuf {
    let config = format!(
        "[wheelwright]\n\
         installer-dir = \"{}\"\n\
         wheel-dir = \"{}\"\n\
         index-url = \"{}\"\n\
         {}\n",
        dir.join("installers").display(),
        dir.join("wheels").display(),
        index_url,
        packages_body
    );
    let path = dir.join("packages.toml");
    std::fs::write(&path, config).unwrap();
    path
}

/// Every member of a wheel, by name
pub fn read_wheel(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut members = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        members.insert(entry.name().to_string(), data);
    }
    members
}

/// Sorted filenames in `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
