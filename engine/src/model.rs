//! Core data model for a backup run.
//!
//! This module defines the main data structures:
//! - BackupOptions: the fully-resolved, immutable run configuration
//! - BackupResult: the run-level tally returned to the caller
//! - CandidateFile: one scanned source file and its classification
//! - TransferOutcome / FileDisposition: what happened to a single file

use std::fmt;
use std::path::{Path, PathBuf};

use crate::checksums::ChecksumAlgorithm;
use crate::error::EngineError;

/// Extensions accepted when the caller does not override them.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".heic", ".mp4", ".mov"];

/// Extension of the one format that is transcoded instead of copied.
pub const CONVERTIBLE_EXTENSION: &str = ".heic";

/// Extension written for converted files.
pub const CONVERTED_EXTENSION: &str = ".jpg";

/// Fully-resolved options for one backup run.
///
/// Built once by the caller (the CLI resolves flags and config files) and
/// never mutated by the engine.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Root of the tree to back up
    pub source_dir: PathBuf,

    /// Root of the date-organized backup tree
    pub target_dir: PathBuf,

    /// Compute every decision but write nothing beyond directories
    pub dry_run: bool,

    /// Confirm same-size duplicates with a content digest
    pub use_hash: bool,

    /// Digest used when `use_hash` is set
    pub hash_algorithm: ChecksumAlgorithm,

    /// Copy the original HEIC next to where the JPEG would go if conversion fails
    pub copy_heic_on_fail: bool,

    /// Reserved for file-partitioned parallelism. Must be at least 1; any
    /// value other than 1 is accepted but the run stays sequential.
    pub workers: usize,

    /// Accepted extensions, lower-cased, each with a leading `.`
    pub extensions: Vec<String>,
}

impl BackupOptions {
    /// Create options with the default extension set and all flags off.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(source_dir: P, target_dir: Q) -> Self {
        BackupOptions {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            dry_run: false,
            use_hash: false,
            hash_algorithm: ChecksumAlgorithm::Sha256,
            copy_heic_on_fail: false,
            workers: 1,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the accepted extensions, normalizing each entry.
    ///
    /// Entries are trimmed and lower-cased, blanks are dropped, duplicates
    /// collapse onto their first occurrence, and a leading `.` is added where
    /// missing.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            if let Some(ext) = normalize_extension(ext.as_ref()) {
                if !normalized.contains(&ext) {
                    normalized.push(ext);
                }
            }
        }
        self.extensions = normalized;
        self
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.source_dir.as_os_str().is_empty() {
            return Err(EngineError::InvalidOptions {
                reason: "source path is empty".to_string(),
            });
        }
        if self.target_dir.as_os_str().is_empty() {
            return Err(EngineError::InvalidOptions {
                reason: "target path is empty".to_string(),
            });
        }
        if self.extensions.is_empty() {
            return Err(EngineError::InvalidOptions {
                reason: "extension set is empty".to_string(),
            });
        }
        if self.workers == 0 {
            return Err(EngineError::InvalidOptions {
                reason: "workers must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// True if `path` has one of the accepted extensions (case-insensitive).
    pub fn accepts(&self, path: &Path) -> bool {
        match dotted_extension(path) {
            Some(ext) => self.extensions.iter().any(|e| *e == ext),
            None => false,
        }
    }
}

/// Normalize one user-supplied extension to `.ext` form.
pub fn normalize_extension(raw: &str) -> Option<String> {
    let ext = raw.trim().to_lowercase();
    if ext.is_empty() || ext == "." {
        return None;
    }
    if ext.starts_with('.') {
        Some(ext)
    } else {
        Some(format!(".{}", ext))
    }
}

/// Lower-cased extension of `path` including the leading `.`.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
}

/// Run-level tally.
///
/// `scanned` is incremented for every candidate. A dry-run file that is not a
/// duplicate lands in none of the other counters, so
/// `scanned == backed_up + skipped_duplicate + failed` does not hold for dry
/// runs. A HEIC whose conversion failed but whose original was copied as a
/// fallback increments both `failed` and `backed_up`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackupResult {
    pub scanned: u64,
    pub backed_up: u64,
    pub converted: u64,
    pub skipped_duplicate: u64,
    pub failed: u64,
}

impl BackupResult {
    /// Fold the disposition of one file into the tally.
    ///
    /// `scanned` is not touched here; the orchestrator counts it before any
    /// per-file work starts so that files failing early are still scanned.
    pub fn record(&mut self, disposition: FileDisposition) {
        match disposition {
            FileDisposition::SkippedDuplicate => self.skipped_duplicate += 1,
            FileDisposition::DryRun => {}
            FileDisposition::Transferred(outcome) => match outcome {
                TransferOutcome::Copied => self.backed_up += 1,
                TransferOutcome::Converted => {
                    self.backed_up += 1;
                    self.converted += 1;
                }
                TransferOutcome::ConvertedFailedCopiedFallback => {
                    self.failed += 1;
                    self.backed_up += 1;
                }
                TransferOutcome::Failed => self.failed += 1,
            },
        }
    }

    /// Count a file whose processing raised an error.
    pub fn record_error(&mut self) {
        self.failed += 1;
    }
}

impl fmt::Display for BackupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scanned={}, backed_up={}, converted={}, skipped_duplicate={}, failed={}",
            self.scanned, self.backed_up, self.converted, self.skipped_duplicate, self.failed
        )
    }
}

/// A scanned source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Absolute path of the source file
    pub path: PathBuf,

    /// True if the file is transcoded (HEIC -> JPEG) instead of copied
    pub convertible: bool,
}

impl CandidateFile {
    pub fn new(path: PathBuf) -> Self {
        let convertible = dotted_extension(&path).as_deref() == Some(CONVERTIBLE_EXTENSION);
        CandidateFile { path, convertible }
    }

    /// File name as it will appear in the target tree.
    ///
    /// Convertible files get their extension rewritten to `.jpg`; everything
    /// else keeps its name unchanged.
    pub fn destination_name(&self) -> Option<PathBuf> {
        let name = PathBuf::from(self.path.file_name()?);
        if self.convertible {
            Some(name.with_extension(&CONVERTED_EXTENSION[1..]))
        } else {
            Some(name)
        }
    }
}

/// Result of the Transfer Executor for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Plain metadata-preserving copy
    Copied,
    /// HEIC transcoded to JPEG
    Converted,
    /// Conversion failed; the original was copied under its own extension
    ConvertedFailedCopiedFallback,
    /// Conversion failed and no fallback copy was written
    Failed,
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOutcome::Copied => write!(f, "Copied"),
            TransferOutcome::Converted => write!(f, "Converted"),
            TransferOutcome::ConvertedFailedCopiedFallback => {
                write!(f, "ConvertedFailedCopiedFallback")
            }
            TransferOutcome::Failed => write!(f, "Failed"),
        }
    }
}

/// What the orchestrator decided for one file that did not raise an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDisposition {
    /// Destination already holds the same content
    SkippedDuplicate,
    /// Dry run: the transfer was only logged
    DryRun,
    /// The Transfer Executor ran
    Transferred(TransferOutcome),
}
