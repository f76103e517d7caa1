//! Windows installer layout
//!
//! The payload appended to the executable is a zip whose top-level
//! directories name the install scheme: `PURELIB/`, `PLATLIB/`, `SCRIPTS/`,
//! `DATA/` and `HEADERS/`. Library directories may carry an `.egg-info` file
//! or directory with the package metadata.

use super::{Layout, Member};
use crate::naming::WheelName;
use tracing::debug;

const EGG_INFO_SUFFIX: &str = ".egg-info";

/// Map wininst members onto wheel paths
///
/// Any `PLATLIB/` member makes the wheel root platlib; `PURELIB/` members
/// then move to `<dist>.data/purelib/`.
pub(super) fn layout(members: Vec<Member>, wheel: &WheelName) -> Layout {
    let data_dir = format!("{}.data", wheel.distribution());
    let has_platlib = members.iter().any(|m| m.path.starts_with("PLATLIB/"));
    let mut layout = Layout::new(!has_platlib);

    for member in members {
        let Some((scheme, rest)) = member.path.split_once('/') else {
            debug!(file = %member.path, "dropping top-level installer member");
            continue;
        };
        let (scheme, rest) = (scheme.to_string(), rest.to_string());

        match scheme.as_str() {
            "PURELIB" | "PLATLIB" => {
                if let Some(name) = egg_info_name(&rest) {
                    if !layout.info.absorb(name, member.data) {
                        debug!(file = %rest, "dropping egg metadata file");
                    }
                    continue;
                }
                let path = if scheme == "PURELIB" && has_platlib {
                    format!("{data_dir}/purelib/{rest}")
                } else {
                    rest
                };
                layout.files.push(Member {
                    path,
                    data: member.data,
                });
            }
            "SCRIPTS" | "DATA" | "HEADERS" => {
                let path = format!("{data_dir}/{}/{rest}", scheme.to_ascii_lowercase());
                layout.files.push(Member {
                    path,
                    data: member.data,
                });
            }
            _ => debug!(file = %member.path, "dropping member outside install schemes"),
        }
    }

    layout
}

/// Name of a metadata file inside a top-level `.egg-info`
///
/// A plain `.egg-info` file is the PKG-INFO itself.
fn egg_info_name(path: &str) -> Option<&str> {
    match path.split_once('/') {
        Some((dir, name)) if dir.ends_with(EGG_INFO_SUFFIX) => Some(name),
        None if path.ends_with(EGG_INFO_SUFFIX) => Some("PKG-INFO"),
        _ => None,
    }
}
