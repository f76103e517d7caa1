//! Egg layout
//!
//! An egg is a zip whose root is the import root. Its metadata lives in
//! `EGG-INFO/`, with console scripts under `EGG-INFO/scripts/`.

use super::{Layout, Member};
use crate::naming::WheelName;
use tracing::debug;

const EGG_INFO_DIR: &str = "EGG-INFO/";
const SCRIPTS_DIR: &str = "scripts/";

/// Map egg members onto wheel paths
pub(super) fn layout(members: Vec<Member>, wheel: &WheelName) -> Layout {
    let data_dir = format!("{}.data", wheel.distribution());
    let mut layout = Layout::new(wheel.is_pure());

    for member in members {
        let Some(meta_path) = member.path.strip_prefix(EGG_INFO_DIR) else {
            layout.files.push(member);
            continue;
        };

        if let Some(script) = meta_path.strip_prefix(SCRIPTS_DIR) {
            let path = format!("{data_dir}/scripts/{script}");
            layout.files.push(Member {
                path,
                data: member.data,
            });
        } else if !layout.info.absorb(meta_path, member.data) {
            debug!(file = meta_path, "dropping egg metadata file");
        }
    }

    layout
}
