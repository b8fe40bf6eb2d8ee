//! Mtime comparison between a file and a sibling derived from it.

use std::path::Path;
use std::time::SystemTime;

fn modified(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}

/// `sibling` exists and was written no earlier than `source` was last changed.
///
/// A missing source is never considered fresh.
pub fn is_sibling_fresh(source: &Path, sibling: &Path) -> bool {
    match (modified(source), modified(sibling)) {
        (Some(source_time), Some(sibling_time)) => sibling_time >= source_time,
        _ => false,
    }
}
