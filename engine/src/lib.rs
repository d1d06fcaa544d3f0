//! # photobak engine - Date-organized media backup
//!
//! One-way backup of a media tree into `<target>/<YYYY>/<MM>/` buckets,
//! skipping files that are already backed up and converting HEIC photos to
//! JPEG on the way.
//!
//! ## Overview
//!
//! The engine is a headless library; the CLI resolves configuration and
//! installs logging, then hands over a `BackupOptions`. It features:
//! - Recursive, extension-filtered scanning
//! - Capture dates from EXIF, falling back to the file's modification time
//! - Size and optional content-digest duplicate detection
//! - HEIC to JPEG conversion through a pluggable converter, with an optional
//!   copy of the original when conversion fails
//! - Per-file error isolation: one bad file never aborts a run
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{run_backup, BackupOptions, CommandConverter, ExifResolver, TracingLogger};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut options = BackupOptions::new("/media/camera", "/backup/photos");
//! options.use_hash = true;
//!
//! let result = run_backup(
//!     &options,
//!     &ExifResolver,
//!     &CommandConverter::default(),
//!     &TracingLogger,
//! )?;
//! println!("{}", result);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Options, result tally and per-file outcomes
//! - **error**: Error types
//! - **scanner**: Source tree enumeration
//! - **metadata**: Capture-time lookup and mtime fallback
//! - **organizer**: Year/month destination paths
//! - **checksums**: Streaming content digests
//! - **dedup**: Duplicate detection
//! - **convert**: HEIC conversion capability
//! - **fs_ops**: Metadata-preserving copy and directory creation
//! - **transfer**: Copy-or-convert for a single file
//! - **logger**: Audit logging port
//! - **job**: Run orchestration

pub mod model;
pub mod error;
pub mod scanner;
pub mod metadata;
pub mod organizer;
pub mod checksums;
pub mod dedup;
pub mod convert;
pub mod fs_ops;
pub mod transfer;
pub mod logger;
pub mod job;

#[cfg(test)]
pub(crate) mod test_support;

pub use model::{
    BackupOptions, BackupResult, CandidateFile, FileDisposition, TransferOutcome,
    DEFAULT_EXTENSIONS,
};
pub use error::EngineError;
pub use job::run_backup;
pub use metadata::{CaptureTimeResolver, ExifResolver};
pub use convert::{CommandConverter, ImageConverter, HEIC_QUALITY};
pub use logger::{BackupLogger, TracingLogger};
pub use checksums::ChecksumAlgorithm;
