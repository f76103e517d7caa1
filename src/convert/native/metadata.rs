//! Egg metadata to dist-info translation

use crate::naming::WheelName;

/// Metadata files picked up from `EGG-INFO/` or an embedded `.egg-info`
#[derive(Debug, Default)]
pub(super) struct EggInfo {
    pkg_info: Option<Vec<u8>>,
    requires: Option<Vec<u8>>,
    entry_points: Option<Vec<u8>>,
    top_level: Option<Vec<u8>>,
}

impl EggInfo {
    /// Keep `name` if it is one of the files carried into the dist-info
    ///
    /// Returns false when the file has no dist-info counterpart.
    pub(super) fn absorb(&mut self, name: &str, data: Vec<u8>) -> bool {
        let slot = match name {
            "PKG-INFO" => &mut self.pkg_info,
            "requires.txt" => &mut self.requires,
            "entry_points.txt" => &mut self.entry_points,
            "top_level.txt" => &mut self.top_level,
            _ => return false,
        };
        *slot = Some(data);
        true
    }

    /// Files of the `.dist-info` directory, excluding WHEEL and RECORD
    pub(super) fn dist_info_files(&self, wheel: &WheelName) -> Vec<(&'static str, Vec<u8>)> {
        let pkg_info = self
            .pkg_info
            .as_deref()
            .map(|data| String::from_utf8_lossy(data).into_owned());
        let requires = self
            .requires
            .as_deref()
            .map(|data| String::from_utf8_lossy(data).into_owned());

        let mut files = vec![(
            "METADATA",
            metadata(pkg_info.as_deref(), wheel, requires.as_deref()).into_bytes(),
        )];
        if let Some(data) = &self.entry_points {
            files.push(("entry_points.txt", data.clone()));
        }
        if let Some(data) = &self.top_level {
            files.push(("top_level.txt", data.clone()));
        }
        files
    }
}

/// Requirements from `requires.txt` as `Requires-Dist` values, plus the extras
///
/// Section headers are `[extra]`, `[:marker]` or `[extra:marker]`.
pub(super) fn requires_dist(requires: &str) -> (Vec<String>, Vec<String>) {
    let mut requirements = Vec::new();
    let mut extras: Vec<String> = Vec::new();
    let mut extra: Option<String> = None;
    let mut marker: Option<String> = None;

    for line in requires.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let (name, condition) = match section.split_once(':') {
                Some((name, condition)) => (name.trim(), condition.trim()),
                None => (section.trim(), ""),
            };
            extra = (!name.is_empty()).then(|| safe_extra(name));
            marker = (!condition.is_empty()).then(|| condition.to_string());
            if let Some(name) = &extra
                && !extras.contains(name)
            {
                extras.push(name.clone());
            }
            continue;
        }

        let requirement = match (&extra, &marker) {
            (None, None) => line.to_string(),
            (Some(extra), None) => format!("{line}; extra == \"{extra}\""),
            (None, Some(marker)) => format!("{line}; {marker}"),
            (Some(extra), Some(marker)) => {
                format!("{line}; ({marker}) and extra == \"{extra}\"")
            }
        };
        requirements.push(requirement);
    }

    (requirements, extras)
}

/// Extra name with runs of unsupported characters collapsed to `_`, lowercased
fn safe_extra(extra: &str) -> String {
    let mut out = String::with_capacity(extra.len());
    let mut in_run = false;
    for c in extra.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            out.push(c.to_ascii_lowercase());
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// Build METADATA from PKG-INFO (if any) and `requires.txt` (if any)
pub(super) fn metadata(pkg_info: Option<&str>, wheel: &WheelName, requires: Option<&str>) -> String {
    let text = pkg_info.map(|s| s.replace("\r\n", "\n")).unwrap_or_default();
    let (headers, body) = match text.split_once("\n\n") {
        Some((headers, body)) => (headers, Some(body)),
        None => (text.trim_end_matches('\n'), None),
    };

    let mut out = String::from("Metadata-Version: 2.1\n");
    let mut has_name = false;
    let mut has_version = false;
    let mut skipping = false;

    for line in headers.lines() {
        if line.starts_with([' ', '\t']) {
            if !skipping {
                out.push_str(line);
                out.push('\n');
            }
            continue;
        }

        let key = line.split_once(':').map(|(key, _)| key.trim());
        skipping = key.is_some_and(|k| k.eq_ignore_ascii_case("Metadata-Version"));
        if skipping {
            continue;
        }
        has_name |= key.is_some_and(|k| k.eq_ignore_ascii_case("Name"));
        has_version |= key.is_some_and(|k| k.eq_ignore_ascii_case("Version"));
        out.push_str(line);
        out.push('\n');
    }

    if !has_name {
        out.push_str(&format!("Name: {}\n", wheel.name));
    }
    if !has_version {
        out.push_str(&format!("Version: {}\n", wheel.version));
    }

    if let Some(requires) = requires {
        let (requirements, extras) = requires_dist(requires);
        for extra in extras {
            out.push_str(&format!("Provides-Extra: {extra}\n"));
        }
        for requirement in requirements {
            out.push_str(&format!("Requires-Dist: {requirement}\n"));
        }
    }

    if let Some(body) = body.filter(|b| !b.trim().is_empty()) {
        out.push('\n');
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

/// Contents of the `WHEEL` file
pub(super) fn wheel_file(wheel: &WheelName, root_is_purelib: bool) -> String {
    let mut out = format!(
        "Wheel-Version: 1.0\nGenerator: wheelwright {}\nRoot-Is-Purelib: {}\n",
        env!("CARGO_PKG_VERSION"),
        root_is_purelib
    );
    for tag in wheel.tags() {
        out.push_str(&format!("Tag: {tag}\n"));
    }
    out
}
