//! Duplicate detection between a source file and its intended destination.
//!
//! A missing destination is never a duplicate. Otherwise sizes must match;
//! with hashing off that alone counts as a duplicate (same-size different
//! files are accepted false positives), with hashing on the content digests
//! decide. Any I/O error resolves to "not a duplicate" so the file is
//! processed again rather than silently skipped.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::checksums::{compute_file_checksum, ChecksumAlgorithm};

/// Decide whether `destination` already holds `source`'s content.
pub fn is_duplicate(
    source: &Path,
    destination: &Path,
    use_hash: bool,
    algorithm: ChecksumAlgorithm,
) -> bool {
    let dst_meta = match fs::metadata(destination) {
        Ok(meta) => meta,
        Err(_) => return false,
    };

    let src_meta = match fs::metadata(source) {
        Ok(meta) => meta,
        Err(e) => {
            debug!("cannot stat {}: {}; treating as new", source.display(), e);
            return false;
        }
    };

    if src_meta.len() != dst_meta.len() {
        return false;
    }

    if !use_hash {
        return true;
    }

    let src_digest = compute_file_checksum(source, algorithm);
    let dst_digest = compute_file_checksum(destination, algorithm);
    match (src_digest, dst_digest) {
        (Ok(a), Ok(b)) => a == b,
        (Err(e), _) | (_, Err(e)) => {
            debug!("digest failed ({}); treating as new", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: ChecksumAlgorithm = ChecksumAlgorithm::Sha256;

    #[test]
    fn test_missing_destination_is_not_duplicate() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.jpg");
        fs::write(&src, b"abc").unwrap();

        assert!(!is_duplicate(&src, &temp_dir.path().join("b.jpg"), false, SHA));
        assert!(!is_duplicate(&src, &temp_dir.path().join("b.jpg"), true, SHA));
    }

    #[test]
    fn test_size_mismatch_is_not_duplicate() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.jpg");
        let dst = temp_dir.path().join("b.jpg");
        fs::write(&src, b"abc").unwrap();
        fs::write(&dst, b"abcd").unwrap();

        assert!(!is_duplicate(&src, &dst, false, SHA));
    }

    #[test]
    fn test_same_size_is_duplicate_without_hash() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.jpg");
        let dst = temp_dir.path().join("b.jpg");
        fs::write(&src, b"abc").unwrap();
        fs::write(&dst, b"xyz").unwrap();

        assert!(is_duplicate(&src, &dst, false, SHA));
    }

    #[test]
    fn test_hash_distinguishes_same_size_content() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.jpg");
        let other = temp_dir.path().join("b.jpg");
        let same = temp_dir.path().join("c.jpg");
        fs::write(&src, b"abc").unwrap();
        fs::write(&other, b"xyz").unwrap();
        fs::write(&same, b"abc").unwrap();

        for algorithm in [ChecksumAlgorithm::Sha256, ChecksumAlgorithm::Blake3] {
            assert!(!is_duplicate(&src, &other, true, algorithm));
            assert!(is_duplicate(&src, &same, true, algorithm));
        }
    }

    #[test]
    fn test_unreadable_source_fails_open() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let dst = temp_dir.path().join("b.jpg");
        fs::write(&dst, b"abc").unwrap();

        assert!(!is_duplicate(&temp_dir.path().join("gone.jpg"), &dst, false, SHA));
    }

    #[test]
    fn test_directory_destination_fails_open_with_hash() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("a.jpg");
        fs::write(&src, b"").unwrap();
        let dst = temp_dir.path().join("dir.jpg");
        fs::create_dir(&dst).unwrap();

        // A directory is never a match, whatever its reported size
        assert!(!is_duplicate(&src, &dst, true, SHA));
    }
}
