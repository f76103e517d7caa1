//! Configuration types for wheelwright
//!
//! The configuration file is TOML. A `[wheelwright]` table holds the run
//! settings; every other table is keyed by package name and may narrow the
//! versions and formats fetched for that package:
//!
//! ```toml
//! [wheelwright]
//! packages = "ZODB3 zope.interface"
//! installer-dir = "installers"
//! wheel-dir = "wheels"
//!
//! [ZODB3]
//! versions = "3.10.5 3.10.4"
//! formats = "bdist_wininst bdist_egg"
//! ```
//!
//! List-valued keys accept either a space-separated string or a TOML array.
//! Dotted package names may be written quoted (`["zope.interface"]`) or bare
//! (`[zope.interface]`); TOML nests the bare form, which is folded back into
//! the dotted name. Keys other than `versions` and `formats` are rejected.

use crate::error::{Error, Result};
use crate::types::PackageSpec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration file read when none is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "packages.toml";

/// Name of the table holding run settings
pub const SETTINGS_SECTION: &str = "wheelwright";

/// Which converter turns installers into wheels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Built-in zip-based converter
    #[default]
    Native,
    /// External `wheel convert` command
    Wheel,
}

/// Run settings from the `[wheelwright]` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    /// Installer store directory (default: "installers")
    #[serde(default = "default_installer_dir")]
    pub installer_dir: PathBuf,

    /// Wheel output directory (default: "wheels")
    #[serde(default = "default_wheel_dir")]
    pub wheel_dir: PathBuf,

    /// Base URL of the index JSON API (default: "https://pypi.org/pypi")
    #[serde(default = "default_index_url")]
    pub index_url: Url,

    /// Converter implementation (default: native)
    #[serde(default)]
    pub converter: ConverterKind,

    /// Path to the `wheel` executable (searched in PATH if None)
    #[serde(default)]
    pub wheel_path: Option<PathBuf>,

    /// Per-request timeout in seconds (None = wait indefinitely)
    #[serde(default)]
    pub request_timeout: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            installer_dir: default_installer_dir(),
            wheel_dir: default_wheel_dir(),
            index_url: default_index_url(),
            converter: ConverterKind::default(),
            wheel_path: None,
            request_timeout: None,
        }
    }
}

impl Settings {
    /// Request timeout as a duration, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }
}

/// Main configuration: settings plus the packages to process
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Run settings
    pub settings: Settings,
    /// Packages in configuration order, without duplicates
    pub packages: Vec<PackageSpec>,
}

impl Config {
    /// Read and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read configuration file '{}': {}", path.display(), e),
            key: None,
        })?;
        debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml_str(&text)
    }

    /// Parse and validate configuration text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(text).map_err(|e| Error::Config {
            message: format!("invalid configuration: {}", e),
            key: None,
        })?;
        raw.validate()
    }

    /// Installer store directory
    pub fn installer_dir(&self) -> &Path {
        &self.settings.installer_dir
    }

    /// Wheel output directory
    pub fn wheel_dir(&self) -> &Path {
        &self.settings.wheel_dir
    }
}

/// A list given either as `"a b c"` or `["a", "b", "c"]`
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum WordList {
    Words(String),
    List(Vec<String>),
}

impl WordList {
    fn into_words(self) -> Vec<String> {
        match self {
            WordList::Words(s) => s.split_whitespace().map(str::to_string).collect(),
            WordList::List(items) => items
                .iter()
                .flat_map(|item| item.split_whitespace())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawSettings {
    packages: Option<WordList>,
    #[serde(flatten)]
    settings: Settings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawPackageSection {
    #[serde(default)]
    versions: Option<WordList>,
    #[serde(default)]
    formats: Option<WordList>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    wheelwright: Option<RawSettings>,
    #[serde(flatten)]
    tables: toml::Table,
}

const SECTION_KEYS: [&str; 2] = ["versions", "formats"];

/// Flatten the package tables into sections keyed by dotted package name
fn package_sections(tables: toml::Table) -> Result<BTreeMap<String, RawPackageSection>> {
    let mut sections = BTreeMap::new();
    for (name, value) in tables {
        collect_section(name, value, &mut sections)?;
    }
    Ok(sections)
}

fn collect_section(
    name: String,
    value: toml::Value,
    sections: &mut BTreeMap<String, RawPackageSection>,
) -> Result<()> {
    let toml::Value::Table(table) = value else {
        return Err(Error::config(
            format!("'{name}' must be a package table"),
            name,
        ));
    };

    let mut fields = toml::Table::new();
    let mut nested = false;
    for (key, value) in table {
        if SECTION_KEYS.contains(&key.as_str()) {
            fields.insert(key, value);
        } else if value.is_table() {
            nested = true;
            collect_section(format!("{name}.{key}"), value, sections)?;
        } else {
            let path = format!("{name}.{key}");
            return Err(Error::config(
                format!("unknown key '{key}' in package table [{name}]"),
                path,
            ));
        }
    }

    if nested && fields.is_empty() {
        return Ok(());
    }
    let section: RawPackageSection = toml::Value::Table(fields).try_into().map_err(|e| {
        Error::config(format!("invalid package table [{name}]: {e}"), name.clone())
    })?;
    if sections.insert(name.clone(), section).is_some() {
        return Err(Error::config(
            format!("package table [{name}] is defined twice"),
            name,
        ));
    }
    Ok(())
}

impl RawConfig {
    fn validate(self) -> Result<Config> {
        let raw = self.wheelwright.ok_or_else(|| {
            Error::config(
                format!("missing [{SETTINGS_SECTION}] section"),
                SETTINGS_SECTION,
            )
        })?;

        let names = raw
            .packages
            .ok_or_else(|| {
                Error::config(
                    "missing required key 'packages'",
                    format!("{SETTINGS_SECTION}.packages"),
                )
            })?
            .into_words();
        let mut sections = package_sections(self.tables)?;

        if raw.settings.converter == ConverterKind::Native && raw.settings.wheel_path.is_some() {
            warn!("'wheel-path' is ignored unless converter = \"wheel\"");
        }

        let mut seen = HashSet::new();
        let mut packages = Vec::with_capacity(names.len());
        for name in names {
            if !seen.insert(name.clone()) {
                debug!(package = %name, "ignoring duplicate package entry");
                continue;
            }
            let section = sections.remove(&name).unwrap_or_default();
            let mut spec = PackageSpec::new(name);
            if let Some(versions) = section.versions {
                spec = spec.with_versions(versions.into_words());
            }
            if let Some(formats) = section.formats {
                spec = spec.with_formats(formats.into_words());
            }
            packages.push(spec);
        }

        for name in sections.keys() {
            warn!(section = %name, "configuration section for unlisted package is ignored");
        }

        Ok(Config {
            settings: raw.settings,
            packages,
        })
    }
}

fn default_installer_dir() -> PathBuf {
    PathBuf::from("installers")
}

fn default_wheel_dir() -> PathBuf {
    PathBuf::from("wheels")
}

#[allow(clippy::expect_used)]
fn default_index_url() -> Url {
    // Literal URL; parsing cannot fail.
    Url::parse("https://pypi.org/pypi").expect("default index URL is valid")
}
