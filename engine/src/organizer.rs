//! Date-bucketed destination paths.
//!
//! Every file lands at `<target>/<YYYY>/<MM>/<name>`. This is the only place
//! in the engine that creates directories inside the target tree.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};

use crate::error::EngineError;
use crate::fs_ops::ensure_dir_exists;

/// `<target_root>/<YYYY>/<MM>` for `dt`, without touching the filesystem.
pub fn bucket_dir(target_root: &Path, dt: &NaiveDateTime) -> PathBuf {
    target_root
        .join(format!("{:04}", dt.year()))
        .join(format!("{:02}", dt.month()))
}

/// Destination path for `file_name` captured at `dt`.
///
/// Creates the year and month directories (and any missing ancestors) if
/// they do not exist yet. Calling it again with the same inputs returns the
/// same path and leaves the tree unchanged.
pub fn destination_for(
    target_root: &Path,
    dt: &NaiveDateTime,
    file_name: &Path,
) -> Result<PathBuf, EngineError> {
    let dir = bucket_dir(target_root, dt);
    ensure_dir_exists(&dir)?;
    Ok(dir.join(file_name))
}
