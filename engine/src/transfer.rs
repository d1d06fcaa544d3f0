//! Transfer executor: copies or converts one file into the target tree.

use std::path::{Path, PathBuf};

use crate::convert::{ImageConverter, HEIC_QUALITY};
use crate::dedup::is_duplicate;
use crate::error::EngineError;
use crate::fs_ops::copy_file_with_metadata;
use crate::logger::BackupLogger;
use crate::model::{BackupOptions, TransferOutcome, CONVERTIBLE_EXTENSION};

/// Transfer `src` to `dst`.
///
/// Non-convertible files are copied verbatim. Convertible files are handed to
/// `converter`; when that fails and `options.copy_heic_on_fail` is set, the
/// original is copied next to `dst` with a `.heic` extension unless an
/// identical file is already there.
///
/// A conversion failure is reported through the returned outcome and the
/// logger, never as an `Err`. `Err` is reserved for a failed plain copy.
pub fn transfer(
    src: &Path,
    dst: &Path,
    convertible: bool,
    options: &BackupOptions,
    converter: &dyn ImageConverter,
    logger: &dyn BackupLogger,
) -> Result<TransferOutcome, EngineError> {
    if !convertible {
        copy_file_with_metadata(src, dst)?;
        logger.info(&format!("COPIED {} -> {}", src.display(), dst.display()));
        return Ok(TransferOutcome::Copied);
    }

    let err = match converter.convert(src, dst, HEIC_QUALITY) {
        Ok(()) => {
            logger.info(&format!("CONVERTED {} -> {}", src.display(), dst.display()));
            return Ok(TransferOutcome::Converted);
        }
        Err(e) => e,
    };

    logger.error(&format!("HEIC_CONVERT_FAIL {} ({})", src.display(), err));
    if !options.copy_heic_on_fail {
        return Ok(TransferOutcome::Failed);
    }

    let fallback = fallback_destination(dst);
    if is_duplicate(src, &fallback, options.use_hash, options.hash_algorithm) {
        logger.info(&format!(
            "SKIP_DUPLICATE {} -> {}",
            src.display(),
            fallback.display()
        ));
        return Ok(TransferOutcome::Failed);
    }

    match copy_file_with_metadata(src, &fallback) {
        Ok(_) => {
            logger.info(&format!(
                "COPIED_HEIC_FAILOVER {} -> {}",
                src.display(),
                fallback.display()
            ));
            Ok(TransferOutcome::ConvertedFailedCopiedFallback)
        }
        Err(e) => {
            logger.error(&format!("HEIC_FAILOVER_FAIL {} ({})", src.display(), e));
            Ok(TransferOutcome::Failed)
        }
    }
}

/// `dst` with the lower-case convertible extension put back.
fn fallback_destination(dst: &Path) -> PathBuf {
    dst.with_extension(&CONVERTIBLE_EXTENSION[1..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CopyingConverter, FailingConverter, RecordingLogger};
    use std::fs;

    fn options(copy_heic_on_fail: bool) -> BackupOptions {
        let mut options = BackupOptions::new("/unused/src", "/unused/dst");
        options.copy_heic_on_fail = copy_heic_on_fail;
        options
    }

    #[test]
    fn test_plain_copy() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("photo.jpg");
        let dst = temp_dir.path().join("out.jpg");
        fs::write(&src, b"jpeg").unwrap();
        let logger = RecordingLogger::default();

        let outcome = transfer(&src, &dst, false, &options(false), &FailingConverter, &logger)
            .expect("Copy should succeed");

        assert_eq!(outcome, TransferOutcome::Copied);
        assert_eq!(fs::read(&dst).unwrap(), b"jpeg");
        assert!(logger.contains("COPIED"));
    }

    #[test]
    fn test_plain_copy_error_propagates() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("vanished.mov");
        let dst = temp_dir.path().join("out.mov");
        let logger = RecordingLogger::default();

        let result = transfer(&src, &dst, false, &options(false), &FailingConverter, &logger);
        assert!(result.is_err());
    }

    #[test]
    fn test_conversion_success() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("clip.heic");
        let dst = temp_dir.path().join("clip.jpg");
        fs::write(&src, b"heic").unwrap();
        let logger = RecordingLogger::default();

        let outcome = transfer(&src, &dst, true, &options(false), &CopyingConverter, &logger).unwrap();

        assert_eq!(outcome, TransferOutcome::Converted);
        assert!(dst.is_file());
        assert!(logger.contains("CONVERTED"));
    }

    #[test]
    fn test_conversion_failure_without_fallback() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("broken.heic");
        let dst = temp_dir.path().join("out").join("broken.jpg");
        fs::create_dir(temp_dir.path().join("out")).unwrap();
        fs::write(&src, b"heic").unwrap();
        let logger = RecordingLogger::default();

        let outcome = transfer(&src, &dst, true, &options(false), &FailingConverter, &logger).unwrap();

        assert_eq!(outcome, TransferOutcome::Failed);
        assert_eq!(fs::read_dir(temp_dir.path().join("out")).unwrap().count(), 0);
        assert!(logger.error_count() >= 1);
    }

    #[test]
    fn test_conversion_failure_with_fallback_copy() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src").join("broken.heic");
        let out = temp_dir.path().join("out");
        let dst = out.join("broken.jpg");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(&src, b"heic").unwrap();
        let logger = RecordingLogger::default();

        let outcome = transfer(&src, &dst, true, &options(true), &FailingConverter, &logger).unwrap();

        assert_eq!(outcome, TransferOutcome::ConvertedFailedCopiedFallback);
        assert_eq!(fs::read(out.join("broken.heic")).unwrap(), b"heic");
        assert!(!dst.exists());
        assert!(logger.contains("COPIED_HEIC_FAILOVER"));
    }

    #[test]
    fn test_fallback_skipped_when_already_present() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src").join("broken.heic");
        let out = temp_dir.path().join("out");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::create_dir_all(&out).unwrap();
        fs::write(&src, b"heic").unwrap();
        fs::write(out.join("broken.heic"), b"heic").unwrap();
        let logger = RecordingLogger::default();

        let outcome = transfer(
            &src,
            &out.join("broken.jpg"),
            true,
            &options(true),
            &FailingConverter,
            &logger,
        )
        .unwrap();

        assert_eq!(outcome, TransferOutcome::Failed);
        assert!(!logger.contains("COPIED_HEIC_FAILOVER"));
    }

    #[test]
    fn test_fallback_copy_error_is_failed() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src").join("broken.heic");
        let out = temp_dir.path().join("out");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        // A directory squatting on the fallback path makes the copy fail
        fs::create_dir_all(out.join("broken.heic")).unwrap();
        fs::write(&src, b"heic").unwrap();
        let logger = RecordingLogger::default();

        let outcome = transfer(
            &src,
            &out.join("broken.jpg"),
            true,
            &options(true),
            &FailingConverter,
            &logger,
        )
        .expect("Fallback failure is an outcome, not an error");

        assert_eq!(outcome, TransferOutcome::Failed);
        assert!(logger.contains("HEIC_FAILOVER_FAIL"));
        assert!(!logger.contains("COPIED_HEIC_FAILOVER"));
        assert!(out.join("broken.heic").is_dir());
    }

    #[test]
    fn test_fallback_extension_is_lower_case() {
        let dst = Path::new("/dst/2024/01/IMG_1.jpg");
        assert_eq!(
            fallback_destination(dst),
            PathBuf::from("/dst/2024/01/IMG_1.heic")
        );
    }
}
