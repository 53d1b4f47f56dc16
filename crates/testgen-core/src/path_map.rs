use std::path::{Component, Path, PathBuf};

use crate::error::{GenError, Result};

/// Map `path` from the source tree into a destination tree by replacing the
/// first segment equal to `source_dir` with `dest`.
///
/// Only the leftmost occurrence is replaced: `src/a/src/b.h` with
/// `dest = tests/ut` becomes `tests/ut/a/src/b.h`.
pub fn map_to_tree(path: &Path, source_dir: &str, dest: &Path) -> Result<PathBuf> {
    let mut mapped = PathBuf::new();
    let mut replaced = false;

    for component in path.components() {
        match component {
            Component::Normal(segment) if !replaced && segment == source_dir => {
                mapped.push(dest);
                replaced = true;
            }
            other => mapped.push(other.as_os_str()),
        }
    }

    if replaced {
        Ok(mapped)
    } else {
        Err(GenError::OutsideSourceTree {
            path: path.to_path_buf(),
            source_dir: source_dir.to_string(),
        })
    }
}
