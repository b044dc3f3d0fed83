//! Destination file lifecycle.
//!
//! Data lands in `<destination>.part` via positional writes; on completion the
//! file is synced and atomically renamed to its final name. An existing
//! `.part` file is the resume point for the next run.

mod writer;

pub use writer::StorageWriter;

use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `file.sra` → `file.sra.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}
