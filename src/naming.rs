//! Wheel filename derivation for legacy installers
//!
//! Maps an installer filename to the name of the wheel it converts into.
//! Two conventions are recognized:
//!
//! - egg archives: `name-ver[-pyver[-arch]].egg`
//! - wininst executables: `name-ver.arch[-pyver].exe`
//!
//! Anything else yields `None`. Installer directories routinely hold unrelated
//! files, so an unparseable name is expected input rather than an error.
//!
//! # Examples
//!
//! ```
//! use wheelwright::naming::derive_wheel_name;
//!
//! let wheel = derive_wheel_name("ZODB3-3.10.5-py2.7-win-amd64.egg").unwrap();
//! assert_eq!(wheel.to_string(), "ZODB3-3.10.5-cp27-none-win_amd64.whl");
//!
//! assert!(derive_wheel_name("README.txt").is_none());
//! ```

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

/// File extension of converted artifacts
pub const WHEEL_EXTENSION: &str = "whl";

/// Platform tag of architecture-neutral wheels, also the "pure" arch sentinel
pub const PURE_PLATFORM: &str = "any";

/// Python tag used when an installer does not name a Python version
pub const UNVERSIONED_PYTHON_TAG: &str = "py2.py3";

/// ABI tag of every converted wheel
pub const ABI_NONE: &str = "none";

const EGG_NAME_PATTERN: &str =
    r"^(?P<name>.+?)-(?P<ver>[^-]+)(-(?P<pyver>py\d\.\d+))?(-(?P<arch>.+?))?\.egg$";

// Literal pattern; covered by the egg tests below.
#[allow(clippy::expect_used)]
static EGG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EGG_NAME_PATTERN).expect("egg filename pattern compiles"));

/// Installer packaging convention, identified by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallerKind {
    /// Legacy egg archive (`bdist_egg`)
    Egg,
    /// Self-extracting Windows installer (`bdist_wininst`)
    Wininst,
}

impl InstallerKind {
    /// Identify the convention from a filename's extension (case-sensitive)
    #[must_use]
    pub fn from_filename(filename: &str) -> Option<Self> {
        [InstallerKind::Egg, InstallerKind::Wininst]
            .into_iter()
            .find(|kind| {
                filename
                    .strip_suffix(kind.extension())
                    .is_some_and(|stem| stem.ends_with('.'))
            })
    }

    /// File extension without the leading dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            InstallerKind::Egg => "egg",
            InstallerKind::Wininst => "exe",
        }
    }

    /// Index `packagetype` tag for this convention
    #[must_use]
    pub const fn package_type(self) -> &'static str {
        match self {
            InstallerKind::Egg => "bdist_egg",
            InstallerKind::Wininst => "bdist_wininst",
        }
    }
}

/// Fields extracted from an installer filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInstallerName {
    /// Distribution name, verbatim
    pub name: String,
    /// Version, verbatim
    pub version: String,
    /// Python version as written in the filename (e.g. `py2.7`), if any
    pub pyver: Option<String>,
    /// Architecture as written in the filename (e.g. `win-amd64`), if any
    pub arch: Option<String>,
}

/// Capability for parsing one installer naming convention
///
/// Implementations return `None` for names they do not recognize.
pub trait InstallerNameParser {
    /// Parse a bare filename (no directory part)
    fn parse(&self, filename: &str) -> Option<ParsedInstallerName>;
}

/// Parser for `name-ver[-pyver][-arch].egg`
///
/// Egg names and versions never contain `-`, so the version ends at the
/// second `-`. An arch with a `py`-prefixed segment means the pyver did not
/// match the `pyX.Y` form; such names are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct EggNameParser;

impl InstallerNameParser for EggNameParser {
    fn parse(&self, filename: &str) -> Option<ParsedInstallerName> {
        let caps = EGG_NAME_RE.captures(filename)?;
        let arch = caps.name("arch").map(|m| m.as_str().to_string());
        if let Some(arch) = &arch
            && arch.split('-').any(|segment| segment.starts_with("py"))
        {
            return None;
        }
        Some(ParsedInstallerName {
            name: caps.name("name")?.as_str().to_string(),
            version: caps.name("ver")?.as_str().to_string(),
            pyver: caps.name("pyver").map(|m| m.as_str().to_string()),
            arch,
        })
    }
}

/// Parser for `name-ver.arch[-pyver].exe`
///
/// The distribution name runs up to the first `-`. A trailing `-py...`
/// segment is the Python version. The remainder splits at its last `.` into
/// version and architecture; wininst installers always carry an architecture.
#[derive(Debug, Clone, Copy, Default)]
pub struct WininstNameParser;

impl InstallerNameParser for WininstNameParser {
    fn parse(&self, filename: &str) -> Option<ParsedInstallerName> {
        let stem = filename.strip_suffix(".exe")?;
        let (name, rest) = stem.split_once('-')?;

        let (rest, pyver) = match rest.rsplit_once('-') {
            Some((head, tail)) if tail.starts_with("py") => (head, Some(tail.to_string())),
            _ => (rest, None),
        };

        let (version, arch) = rest.rsplit_once('.')?;
        if name.is_empty() || version.is_empty() || arch.is_empty() {
            return None;
        }

        Some(ParsedInstallerName {
            name: name.to_string(),
            version: version.to_string(),
            pyver,
            arch: Some(arch.to_string()),
        })
    }
}

/// Canonical wheel filename components
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WheelName {
    /// Distribution name
    pub name: String,
    /// Distribution version
    pub version: String,
    /// Python tag, possibly compressed (`py2.py3`)
    pub python_tag: String,
    /// ABI tag
    pub abi_tag: String,
    /// Platform tag
    pub platform_tag: String,
}

impl WheelName {
    /// Compose the wheel tags from parsed installer fields
    ///
    /// - python tag: pyver with dots removed, or `py2.py3` when absent
    /// - platform tag: `any` when there is no arch, else arch with `.`/`-` as `_`
    /// - a real architecture turns each `py` prefix of the python tag into `cp`
    /// - ABI tag: always `none`
    #[must_use]
    pub fn from_parsed(parsed: &ParsedInstallerName) -> Self {
        let mut python_tag = match &parsed.pyver {
            Some(pyver) => pyver.replace('.', ""),
            None => UNVERSIONED_PYTHON_TAG.to_string(),
        };

        let platform_tag = match parsed.arch.as_deref() {
            None | Some("") => PURE_PLATFORM.to_string(),
            Some(arch) => arch.replace(['.', '-'], "_"),
        };

        if platform_tag != PURE_PLATFORM {
            python_tag = python_tag
                .split('.')
                .map(|tag| match tag.strip_prefix("py") {
                    Some(rest) => format!("cp{rest}"),
                    None => tag.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".");
        }

        Self {
            name: parsed.name.clone(),
            version: parsed.version.clone(),
            python_tag,
            abi_tag: ABI_NONE.to_string(),
            platform_tag,
        }
    }

    /// Wheel filename, e.g. `ZODB3-3.10.5-cp27-none-win_amd64.whl`
    #[must_use]
    pub fn file_name(&self) -> String {
        self.to_string()
    }

    /// Whether the wheel is architecture-neutral
    #[must_use]
    pub fn is_pure(&self) -> bool {
        self.platform_tag == PURE_PLATFORM
    }

    /// `name-version`, the prefix of the `.dist-info` and `.data` directories
    #[must_use]
    pub fn distribution(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Expanded `py-abi-platform` tags, one per python tag component
    pub fn tags(&self) -> impl Iterator<Item = String> + '_ {
        self.python_tag
            .split('.')
            .map(move |py| format!("{}-{}-{}", py, self.abi_tag, self.platform_tag))
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}.{}",
            self.name,
            self.version,
            self.python_tag,
            self.abi_tag,
            self.platform_tag,
            WHEEL_EXTENSION
        )
    }
}

/// Parse an installer filename with the built-in parsers
///
/// Any directory part of `filename` is ignored.
#[must_use]
pub fn parse_installer_name(filename: &str) -> Option<(InstallerKind, ParsedInstallerName)> {
    parse_installer_name_with(filename, &WininstNameParser)
}

fn parse_installer_name_with(
    filename: &str,
    wininst: &dyn InstallerNameParser,
) -> Option<(InstallerKind, ParsedInstallerName)> {
    let basename = Path::new(filename).file_name()?.to_str()?;
    let kind = InstallerKind::from_filename(basename)?;
    let parsed = match kind {
        InstallerKind::Egg => EggNameParser.parse(basename)?,
        InstallerKind::Wininst => wininst.parse(basename)?,
    };
    Some((kind, parsed))
}

/// Derive the wheel name for an installer filename
///
/// Returns `None` when the filename does not follow a recognized convention.
#[must_use]
pub fn derive_wheel_name(filename: &str) -> Option<WheelName> {
    derive_wheel_name_with(filename, &WininstNameParser)
}

/// Derive the wheel name using a custom parser for wininst filenames
#[must_use]
pub fn derive_wheel_name_with(
    filename: &str,
    wininst: &dyn InstallerNameParser,
) -> Option<WheelName> {
    parse_installer_name_with(filename, wininst).map(|(_, parsed)| WheelName::from_parsed(&parsed))
}
