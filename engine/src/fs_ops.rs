//! Filesystem operations module.
//!
//! Low-level helpers shared by the organizer and the transfer executor:
//! - Copying files with timestamp and permission preservation
//! - Creating directories recursively, tolerating concurrent creation

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use filetime::FileTime;
use tracing::debug;

use crate::error::EngineError;

/// Copy a file from source to destination with metadata preservation.
///
/// An existing destination is truncated and overwritten. Access and
/// modification times and permissions are restored after the contents are
/// written; failures at that stage are logged and ignored.
///
/// # Returns
/// Number of bytes copied
pub fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<u64, EngineError> {
    let mut src_file = fs::File::open(src).map_err(|e| EngineError::ReadError {
        path: src.to_path_buf(),
        source: e,
    })?;

    let src_metadata = src_file.metadata().map_err(|e| EngineError::MetadataError {
        path: src.to_path_buf(),
        source: e,
    })?;

    let mut dst_file = fs::File::create(dst).map_err(|e| EngineError::WriteError {
        path: dst.to_path_buf(),
        source: e,
    })?;

    let bytes_copied = io::copy(&mut src_file, &mut dst_file).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            EngineError::WriteError {
                path: dst.to_path_buf(),
                source: e,
            }
        } else {
            EngineError::ReadError {
                path: src.to_path_buf(),
                source: e,
            }
        }
    })?;

    dst_file.sync_all().map_err(|e| EngineError::WriteError {
        path: dst.to_path_buf(),
        source: e,
    })?;
    drop(dst_file);

    let mtime = src_metadata.modified().unwrap_or_else(|_| SystemTime::now());
    let atime = src_metadata.accessed().unwrap_or(mtime);
    if let Err(e) = filetime::set_file_times(
        dst,
        FileTime::from_system_time(atime),
        FileTime::from_system_time(mtime),
    ) {
        debug!("could not preserve timestamps on {}: {}", dst.display(), e);
    }

    if let Err(e) = fs::set_permissions(dst, src_metadata.permissions()) {
        debug!("could not preserve permissions on {}: {}", dst.display(), e);
    }

    Ok(bytes_copied)
}

/// Ensure `dir` exists as a directory, creating it and any missing ancestors.
///
/// Succeeds if the directory already exists, including when another caller
/// creates it concurrently. Fails if the path exists as something else.
pub fn ensure_dir_exists(dir: &Path) -> Result<(), EngineError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    match fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(EngineError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::AlreadyExists,
                "Path exists but is not a directory",
            ),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            // create_dir_all treats an already-existing directory as success
            fs::create_dir_all(dir).map_err(|e| EngineError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(EngineError::DirectoryCreationFailed {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}
