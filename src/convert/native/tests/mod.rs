use super::*;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Zip archive bytes containing the given members
fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ::zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Write an egg (a plain zip) named `name` into `dir`
fn create_egg(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, zip_bytes(files)).unwrap();
    path
}

/// Write a wininst executable: a stub followed by the zip payload
fn create_wininst(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> PathBuf {
    let mut bytes = b"MZ\x90\x00 stub for tests, not a real PE header".to_vec();
    bytes.extend_from_slice(&[0u8; 512]);
    bytes.extend_from_slice(&zip_bytes(files));

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Every member of a wheel, by name
fn read_wheel(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ::zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut members = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        members.insert(entry.name().to_string(), data);
    }
    members
}

fn text(members: &BTreeMap<String, Vec<u8>>, name: &str) -> String {
    let data = members
        .get(name)
        .unwrap_or_else(|| panic!("{name} missing from wheel"));
    String::from_utf8(data.clone()).unwrap()
}

fn names(members: &BTreeMap<String, Vec<u8>>) -> Vec<&str> {
    members.keys().map(String::as_str).collect()
}

const ZODB_PKG_INFO: &[u8] = b"Metadata-Version: 1.1\nName: ZODB3\nVersion: 3.10.5\nSummary: Zope Object Database\n";

// ---------------------------------------------------------------------------
// Eggs
// ---------------------------------------------------------------------------

#[test]
fn platform_egg_becomes_platlib_wheel() {
    let temp = TempDir::new().unwrap();
    let egg = create_egg(
        temp.path(),
        "ZODB3-3.10.5-py2.7-win-amd64.egg",
        &[
            ("ZODB/__init__.py", b"# ZODB\n"),
            ("ZODB/_persistent.pyd", b"\x00binary"),
            ("EGG-INFO/PKG-INFO", ZODB_PKG_INFO),
            (
                "EGG-INFO/requires.txt",
                b"transaction>=1.1.0\nzope.interface\n\n[test]\nzope.testing\n",
            ),
            (
                "EGG-INFO/entry_points.txt",
                b"[console_scripts]\nrunzeo = ZEO.runzeo:main\n",
            ),
            ("EGG-INFO/top_level.txt", b"ZODB\n"),
            ("EGG-INFO/SOURCES.txt", b"setup.py\n"),
            ("EGG-INFO/zip-safe", b""),
            ("EGG-INFO/scripts/fsdump", b"#!python\n"),
        ],
    );

    let wheel = convert_installer(&egg, temp.path()).unwrap();
    assert_eq!(
        wheel,
        temp.path().join("ZODB3-3.10.5-cp27-none-win_amd64.whl")
    );
    assert!(!temp_path_for(&wheel).exists());

    let members = read_wheel(&wheel);
    assert_eq!(
        names(&members),
        vec![
            "ZODB/__init__.py",
            "ZODB/_persistent.pyd",
            "ZODB3-3.10.5.data/scripts/fsdump",
            "ZODB3-3.10.5.dist-info/METADATA",
            "ZODB3-3.10.5.dist-info/RECORD",
            "ZODB3-3.10.5.dist-info/WHEEL",
            "ZODB3-3.10.5.dist-info/entry_points.txt",
            "ZODB3-3.10.5.dist-info/top_level.txt",
        ]
    );

    let metadata = text(&members, "ZODB3-3.10.5.dist-info/METADATA");
    assert!(metadata.starts_with("Metadata-Version: 2.1\nName: ZODB3\n"));
    assert!(metadata.contains("Provides-Extra: test\n"));
    assert!(metadata.contains("Requires-Dist: transaction>=1.1.0\n"));
    assert!(metadata.contains("Requires-Dist: zope.testing; extra == \"test\"\n"));

    let wheel_file = text(&members, "ZODB3-3.10.5.dist-info/WHEEL");
    assert!(wheel_file.contains("Root-Is-Purelib: false\n"));
    assert!(wheel_file.contains("Tag: cp27-none-win_amd64\n"));
    assert_eq!(members["ZODB/_persistent.pyd"], b"\x00binary");
}

#[test]
fn pure_egg_becomes_purelib_wheel() {
    let temp = TempDir::new().unwrap();
    let egg = create_egg(
        temp.path(),
        "six-1.2.0-py2.7.egg",
        &[("six.py", b"# six\n"), ("EGG-INFO/PKG-INFO", b"Name: six\n")],
    );

    let wheel = convert_installer(&egg, temp.path()).unwrap();
    assert_eq!(wheel.file_name().unwrap(), "six-1.2.0-py27-none-any.whl");

    let members = read_wheel(&wheel);
    let wheel_file = text(&members, "six-1.2.0.dist-info/WHEEL");
    assert!(wheel_file.contains("Root-Is-Purelib: true\n"));
    assert!(wheel_file.contains("Tag: py27-none-any\n"));

    // Version synthesized next to the existing Name
    let metadata = text(&members, "six-1.2.0.dist-info/METADATA");
    assert_eq!(metadata, "Metadata-Version: 2.1\nName: six\nVersion: 1.2.0\n");
}

#[test]
fn record_matches_wheel_contents() {
    let temp = TempDir::new().unwrap();
    let egg = create_egg(
        temp.path(),
        "six-1.2.0-py2.7.egg",
        &[("six.py", b"# six\n"), ("EGG-INFO/PKG-INFO", b"Name: six\n")],
    );

    let wheel = convert_installer(&egg, temp.path()).unwrap();
    let members = read_wheel(&wheel);
    let record = text(&members, "six-1.2.0.dist-info/RECORD");

    let mut recorded = Vec::new();
    for line in record.lines() {
        let mut fields = line.splitn(3, ',');
        let (path, hash, size) = (
            fields.next().unwrap(),
            fields.next().unwrap(),
            fields.next().unwrap(),
        );
        recorded.push(path.to_string());

        if path == "six-1.2.0.dist-info/RECORD" {
            assert_eq!((hash, size), ("", ""));
            continue;
        }
        let data = &members[path];
        let expected = format!("sha256={}", URL_SAFE_NO_PAD.encode(Sha256::digest(data)));
        assert_eq!(hash, expected, "hash of {path}");
        assert_eq!(size, data.len().to_string(), "size of {path}");
    }

    recorded.sort();
    assert_eq!(recorded, names(&members));
    assert_eq!(record.lines().last(), Some("six-1.2.0.dist-info/RECORD,,"));
}

#[test]
fn shipped_dist_info_does_not_replace_generated_files() {
    let temp = TempDir::new().unwrap();
    let egg = create_egg(
        temp.path(),
        "six-1.2.0-py2.7.egg",
        &[
            ("six.py", b"# six\n"),
            ("EGG-INFO/PKG-INFO", b"Name: six\n"),
            ("six-1.2.0.dist-info/METADATA", b"Name: stale\n"),
            ("six-1.2.0.dist-info/RECORD", b"six.py,,\n"),
        ],
    );

    let wheel = convert_installer(&egg, temp.path()).unwrap();
    let archive = ::zip::ZipArchive::new(File::open(&wheel).unwrap()).unwrap();
    let members = read_wheel(&wheel);
    // No member is written twice
    assert_eq!(archive.len(), members.len());

    let metadata = text(&members, "six-1.2.0.dist-info/METADATA");
    assert_eq!(metadata, "Metadata-Version: 2.1\nName: six\nVersion: 1.2.0\n");
    let record = text(&members, "six-1.2.0.dist-info/RECORD");
    assert!(record.contains("six.py,sha256="));
    assert_eq!(record.lines().last(), Some("six-1.2.0.dist-info/RECORD,,"));
}

// ---------------------------------------------------------------------------
// Windows installers
// ---------------------------------------------------------------------------

#[test]
fn wininst_payload_is_mapped_by_scheme() {
    let temp = TempDir::new().unwrap();
    let exe = create_wininst(
        temp.path(),
        "foo-1.0.win32-py2.7.exe",
        &[
            ("PURELIB/foo/__init__.py", b"# foo\n"),
            ("PURELIB/foo-1.0-py2.7.egg-info", b"Metadata-Version: 1.0\nName: foo\nVersion: 1.0\n"),
            ("SCRIPTS/foo-script.py", b"print('foo')\n"),
            ("DATA/share/foo/readme.txt", b"data\n"),
            ("HEADERS/foo.h", b"/* foo */\n"),
            ("README", b"dropped\n"),
        ],
    );

    let wheel = convert_installer(&exe, temp.path()).unwrap();
    assert_eq!(wheel.file_name().unwrap(), "foo-1.0-cp27-none-win32.whl");

    let members = read_wheel(&wheel);
    assert_eq!(
        names(&members),
        vec![
            "foo-1.0.data/data/share/foo/readme.txt",
            "foo-1.0.data/headers/foo.h",
            "foo-1.0.data/scripts/foo-script.py",
            "foo-1.0.dist-info/METADATA",
            "foo-1.0.dist-info/RECORD",
            "foo-1.0.dist-info/WHEEL",
            "foo/__init__.py",
        ]
    );
    assert_eq!(
        text(&members, "foo-1.0.dist-info/METADATA"),
        "Metadata-Version: 2.1\nName: foo\nVersion: 1.0\n"
    );
    assert!(text(&members, "foo-1.0.dist-info/WHEEL").contains("Root-Is-Purelib: true\n"));
}

#[test]
fn wininst_with_platlib_moves_purelib_to_data() {
    let temp = TempDir::new().unwrap();
    let exe = create_wininst(
        temp.path(),
        "bar-2.0.win-amd64-py2.7.exe",
        &[
            ("PLATLIB/bar/_speedups.pyd", b"\x00"),
            ("PLATLIB/bar/__init__.py", b""),
            ("PURELIB/bar_helpers.py", b""),
            (
                "PLATLIB/bar-2.0-py2.7.egg-info/PKG-INFO",
                b"Metadata-Version: 1.1\nName: bar\nVersion: 2.0\n",
            ),
            ("PLATLIB/bar-2.0-py2.7.egg-info/requires.txt", b"six\n"),
        ],
    );

    let wheel = convert_installer(&exe, temp.path()).unwrap();
    assert_eq!(wheel.file_name().unwrap(), "bar-2.0-cp27-none-win_amd64.whl");

    let members = read_wheel(&wheel);
    assert!(members.contains_key("bar/_speedups.pyd"));
    assert!(members.contains_key("bar-2.0.data/purelib/bar_helpers.py"));
    assert!(!members.contains_key("bar_helpers.py"));
    assert!(text(&members, "bar-2.0.dist-info/WHEEL").contains("Root-Is-Purelib: false\n"));
    assert!(text(&members, "bar-2.0.dist-info/METADATA").contains("Requires-Dist: six\n"));
}

#[test]
fn wininst_without_metadata_gets_minimal_metadata() {
    let temp = TempDir::new().unwrap();
    let exe = create_wininst(
        temp.path(),
        "baz-0.1.win32.exe",
        &[("PURELIB/baz.py", b"")],
    );

    let wheel = convert_installer(&exe, temp.path()).unwrap();
    assert_eq!(wheel.file_name().unwrap(), "baz-0.1-cp2.cp3-none-win32.whl");

    let members = read_wheel(&wheel);
    assert_eq!(
        text(&members, "baz-0.1.dist-info/METADATA"),
        "Metadata-Version: 2.1\nName: baz\nVersion: 0.1\n"
    );
    let wheel_file = text(&members, "baz-0.1.dist-info/WHEEL");
    assert!(wheel_file.contains("Tag: cp2-none-win32\nTag: cp3-none-win32\n"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn unrecognized_name_is_rejected_before_reading() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("setup.exe");
    std::fs::write(&path, zip_bytes(&[("PURELIB/x.py", b"")])).unwrap();

    let err = convert_installer(&path, temp.path()).unwrap_err();
    match err {
        Error::Conversion(ConversionError::UnrecognizedInstaller { installer }) => {
            assert_eq!(installer, path);
        }
        other => panic!("expected UnrecognizedInstaller, got {other:?}"),
    }
}

#[test]
fn corrupt_installer_leaves_no_output() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("foo-1.0.win32-py2.7.exe");
    std::fs::write(&path, b"MZ this is not a zip payload").unwrap();

    let err = convert_installer(&path, temp.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Conversion(ConversionError::InvalidArchive { .. })
    ));

    let wheel = temp.path().join("foo-1.0-cp27-none-win32.whl");
    assert!(!wheel.exists());
    assert!(!temp_path_for(&wheel).exists());
}

#[test]
fn missing_installer_is_an_io_error() {
    let temp = TempDir::new().unwrap();
    let err = convert_installer(&temp.path().join("foo-1.0.win32.exe"), temp.path()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

// ---------------------------------------------------------------------------
// Converter trait
// ---------------------------------------------------------------------------

#[tokio::test]
async fn native_converter_writes_into_destination() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("wheels");
    std::fs::create_dir(&dest).unwrap();
    let egg = create_egg(
        temp.path(),
        "six-1.2.0-py2.7.egg",
        &[("six.py", b"# six\n")],
    );

    NativeConverter.convert(&egg, &dest).await.unwrap();
    assert!(dest.join("six-1.2.0-py27-none-any.whl").is_file());
    assert_eq!(NativeConverter.name(), "native");
}
