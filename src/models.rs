//! Model discovery for `@` markers.
//!
//! A model is only usable as a paired set: the `.xml` description plus a
//! `.bin` weights file with the same base name in the same directory.
//! Unpaired descriptions are skipped.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::markers::MarkerError;

const MODEL_EXT: &str = "xml";
const WEIGHTS_EXT: &str = "bin";

/// Recursively collects the paired model description files under `root`.
///
/// A missing root directory invalidates every combination of the sweep, so
/// it fails here rather than expanding to nothing. Discovered paths are
/// sorted lexicographically to keep sweep ordering reproducible across
/// filesystems.
pub fn discover(root: &Path) -> Result<Vec<String>, MarkerError> {
    if !root.is_dir() {
        return Err(MarkerError::ModelDirMissing(root.to_path_buf()));
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(root).into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                warn!("Skipping unreadable entry under {:?}: {}", root, err);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != MODEL_EXT {
            continue;
        }

        if !path.with_extension(WEIGHTS_EXT).is_file() {
            debug!("No weights file next to {:?}, skipping", path);
            continue;
        }

        found.push(path.to_string_lossy().into_owned());
    }

    found.sort();
    debug!("Discovered {} paired models under {:?}", found.len(), root);
    Ok(found)
}
