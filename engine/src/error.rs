//! Error types for the backup engine.
//!
//! `EngineError` covers both run-level faults (missing source, bad options)
//! and the per-file faults raised while a single file is being processed.
//! Per-file errors never leave the orchestrator loop; they are logged and
//! tallied as `failed` in the run's `BackupResult`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Source directory does not exist
    #[error("Source directory not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    /// Source path exists but is not a directory
    #[error("Source is not a directory: {}", path.display())]
    SourceNotDirectory { path: PathBuf },

    /// Failed to create a directory in the target tree
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    /// Failed to read from a file
    #[error("Failed to read file {}: {source}", path.display())]
    ReadError { path: PathBuf, source: io::Error },

    /// Failed to write to a destination file
    #[error("Failed to write file {}: {source}", path.display())]
    WriteError { path: PathBuf, source: io::Error },

    /// Failed to stat a file
    #[error("Failed to read metadata for {}: {source}", path.display())]
    MetadataError { path: PathBuf, source: io::Error },

    /// The convert capability could not transcode a file
    #[error("Conversion failed for {}: {reason}", path.display())]
    ConversionFailed { path: PathBuf, reason: String },

    /// Options failed validation before the run started
    #[error("Invalid backup options: {reason}")]
    InvalidOptions { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_path() {
        let err = EngineError::ConversionFailed {
            path: PathBuf::from("/photos/broken.heic"),
            reason: "exit status 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("broken.heic"));
        assert!(msg.contains("exit status 1"));
    }

    #[test]
    fn test_io_source_is_exposed() {
        use std::error::Error as _;
        let err = EngineError::ReadError {
            path: PathBuf::from("/a.jpg"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.source().is_some());
    }
}
