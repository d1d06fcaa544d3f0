//! Source tree enumeration.
//!
//! Walks the source root recursively and yields the regular files whose
//! extension is in the accepted set. Traversal is lazy and in filesystem
//! order; nothing is sorted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::EngineError;
use crate::model::{dotted_extension, CandidateFile};

/// Start a scan of `root`, yielding candidates whose extension is in
/// `extensions` (lower-case, dotted).
///
/// Fails with `SourceNotFound` if `root` does not exist. Entries that cannot
/// be read during the walk are logged and skipped.
pub fn scan<'a>(
    root: &Path,
    extensions: &'a [String],
) -> Result<impl Iterator<Item = CandidateFile> + 'a, EngineError> {
    let root = resolve_root(root)?;

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| {
            let file_type = entry.file_type();
            // Symlinks count only when they resolve to a regular file
            file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
        })
        .filter(move |entry| match dotted_extension(entry.path()) {
            Some(ext) => extensions.iter().any(|e| *e == ext),
            None => false,
        })
        .map(|entry| CandidateFile::new(entry.into_path()));

    Ok(walker)
}

fn resolve_root(root: &Path) -> Result<PathBuf, EngineError> {
    let metadata = fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EngineError::SourceNotFound {
            path: root.to_path_buf(),
        },
        _ => EngineError::MetadataError {
            path: root.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_dir() {
        return Err(EngineError::SourceNotDirectory {
            path: root.to_path_buf(),
        });
    }

    fs::canonicalize(root).map_err(|e| EngineError::MetadataError {
        path: root.to_path_buf(),
        source: e,
    })
}
