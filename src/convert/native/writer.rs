//! Zip writer that keeps the wheel RECORD

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{Seek, Write};
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Writes wheel members and records each one for `RECORD`
pub(super) struct WheelWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    record: Vec<String>,
    seen: HashSet<String>,
}

impl<W: Write + Seek> WheelWriter<W> {
    pub(super) fn new(inner: W) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            record: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Add a member; returns false (and writes nothing) for a repeated path
    pub(super) fn add(&mut self, path: &str, data: &[u8]) -> ZipResult<bool> {
        if !self.seen.insert(path.to_string()) {
            return Ok(false);
        }
        self.zip.start_file(path, options())?;
        self.zip.write_all(data)?;
        self.record.push(record_line(path, data));
        Ok(true)
    }

    /// Claim `path` so later `add` calls for it are refused
    pub(super) fn reserve(&mut self, path: &str) {
        self.seen.insert(path.to_string());
    }

    /// Write `RECORD` at `record_path` as the last member and close the archive
    pub(super) fn finish(mut self, record_path: &str) -> ZipResult<W> {
        let mut record = String::new();
        for line in &self.record {
            record.push_str(line);
            record.push('\n');
        }
        record.push_str(&csv_field(record_path));
        record.push_str(",,\n");

        self.zip.start_file(record_path, options())?;
        self.zip.write_all(record.as_bytes())?;
        self.zip.finish()
    }
}

fn options() -> FileOptions {
    FileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// `path,sha256=<digest>,size` for one member
pub(super) fn record_line(path: &str, data: &[u8]) -> String {
    format!(
        "{},sha256={},{}",
        csv_field(path),
        URL_SAFE_NO_PAD.encode(Sha256::digest(data)),
        data.len()
    )
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}
