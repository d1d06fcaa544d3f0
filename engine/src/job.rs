//! Backup orchestration.
//!
//! `run_backup` drives one run end to end:
//! - Validating options and checking the source root
//! - Ensuring the target root exists
//! - For every scanned candidate: resolving its capture date, building its
//!   destination, checking for a duplicate, and transferring it
//!
//! Errors raised while handling one file are logged and counted as `failed`;
//! they never stop the loop. Only run-level problems (bad options, missing
//! source, uncreatable target root) are returned as `Err`.

use uuid::Uuid;

use crate::convert::ImageConverter;
use crate::dedup::is_duplicate;
use crate::error::EngineError;
use crate::fs_ops::ensure_dir_exists;
use crate::logger::BackupLogger;
use crate::metadata::{capture_datetime, CaptureTimeResolver};
use crate::model::{BackupOptions, BackupResult, CandidateFile, FileDisposition};
use crate::organizer::destination_for;
use crate::scanner;
use crate::transfer::transfer;

/// Run a backup with the given collaborators.
///
/// Files are processed one at a time in scan order. `options.workers` other
/// than 1 only produces a warning.
///
/// # Errors
/// Returns `EngineError` for run-level faults, before any file is touched.
/// Per-file faults are reflected in `BackupResult::failed`.
pub fn run_backup(
    options: &BackupOptions,
    resolver: &dyn CaptureTimeResolver,
    converter: &dyn ImageConverter,
    logger: &dyn BackupLogger,
) -> Result<BackupResult, EngineError> {
    options.validate()?;

    // Checks the source root before anything is created
    let candidates = scanner::scan(&options.source_dir, &options.extensions)?;
    ensure_dir_exists(&options.target_dir)?;

    let run_id = Uuid::new_v4();
    logger.info(&format!(
        "RUN_START {} {} -> {}",
        run_id,
        options.source_dir.display(),
        options.target_dir.display()
    ));

    if options.workers != 1 {
        logger.warn(&format!(
            "workers is {} but backups run single-threaded; continuing with 1",
            options.workers
        ));
    }

    let mut result = BackupResult::default();
    for candidate in candidates {
        result.scanned += 1;
        match process_file(&candidate, options, resolver, converter, logger) {
            Ok(disposition) => result.record(disposition),
            Err(e) => {
                result.record_error();
                logger.error(&format!("FAILED {} ({})", candidate.path.display(), e));
            }
        }
    }

    logger.info(&format!("RUN_END {} {}", run_id, result));
    Ok(result)
}

/// Resolve, dedup-check and transfer one file.
fn process_file(
    candidate: &CandidateFile,
    options: &BackupOptions,
    resolver: &dyn CaptureTimeResolver,
    converter: &dyn ImageConverter,
    logger: &dyn BackupLogger,
) -> Result<FileDisposition, EngineError> {
    let src = candidate.path.as_path();
    let captured = capture_datetime(resolver, src)?;

    let file_name = candidate
        .destination_name()
        .ok_or_else(|| EngineError::MetadataError {
            path: src.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
    let dest = destination_for(&options.target_dir, &captured, &file_name)?;

    if is_duplicate(src, &dest, options.use_hash, options.hash_algorithm) {
        logger.info(&format!("SKIP_DUPLICATE {} -> {}", src.display(), dest.display()));
        return Ok(FileDisposition::SkippedDuplicate);
    }

    if options.dry_run {
        logger.info(&format!("DRY_RUN {} -> {}", src.display(), dest.display()));
        return Ok(FileDisposition::DryRun);
    }

    let outcome = transfer(src, &dest, candidate.convertible, options, converter, logger)?;
    Ok(FileDisposition::Transferred(outcome))
}
