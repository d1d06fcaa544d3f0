//! Fakes and fixtures shared by the engine's unit tests.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use filetime::FileTime;

use crate::convert::ImageConverter;
use crate::error::EngineError;
use crate::logger::BackupLogger;

/// Minimal JPEG carrying only an EXIF APP1 segment with `DateTimeOriginal`
/// set to `datetime` (`YYYY:MM:DD HH:MM:SS`).
pub fn exif_jpeg(datetime: &str) -> Vec<u8> {
    assert_eq!(datetime.len(), 19, "EXIF datetimes are 19 characters");

    // Big-endian TIFF: header, IFD0 with an Exif IFD pointer, Exif IFD with
    // one ASCII entry, then the 20-byte string.
    let mut tiff: Vec<u8> = Vec::new();
    tiff.extend_from_slice(b"MM");
    tiff.extend_from_slice(&42u16.to_be_bytes());
    tiff.extend_from_slice(&8u32.to_be_bytes());

    // IFD0 at 8
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x8769u16.to_be_bytes());
    tiff.extend_from_slice(&4u16.to_be_bytes());
    tiff.extend_from_slice(&1u32.to_be_bytes());
    tiff.extend_from_slice(&26u32.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());

    // Exif IFD at 26
    tiff.extend_from_slice(&1u16.to_be_bytes());
    tiff.extend_from_slice(&0x9003u16.to_be_bytes());
    tiff.extend_from_slice(&2u16.to_be_bytes());
    tiff.extend_from_slice(&20u32.to_be_bytes());
    tiff.extend_from_slice(&44u32.to_be_bytes());
    tiff.extend_from_slice(&0u32.to_be_bytes());

    // Value at 44
    tiff.extend_from_slice(datetime.as_bytes());
    tiff.push(0);

    let mut app1: Vec<u8> = b"Exif\0\0".to_vec();
    app1.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((app1.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&app1);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

/// Set the mtime of `path` to local noon on the given day and return that
/// local datetime.
pub fn pin_mtime(path: &Path, year: i32, month: u32, day: u32) -> NaiveDateTime {
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time");
    let local = Local
        .from_local_datetime(&naive)
        .single()
        .expect("unambiguous local time");
    filetime::set_file_mtime(path, FileTime::from_unix_time(local.timestamp(), 0))
        .expect("Failed to set mtime");
    naive
}

/// Converter that always fails.
pub struct FailingConverter;

impl ImageConverter for FailingConverter {
    fn convert(&self, src: &Path, _dst: &Path, _quality: u8) -> Result<(), EngineError> {
        Err(EngineError::ConversionFailed {
            path: src.to_path_buf(),
            reason: "unsupported HEIF variant".to_string(),
        })
    }
}

/// Converter that "converts" by copying the bytes unchanged.
pub struct CopyingConverter;

impl ImageConverter for CopyingConverter {
    fn convert(&self, src: &Path, dst: &Path, _quality: u8) -> Result<(), EngineError> {
        fs::copy(src, dst).map_err(|e| EngineError::WriteError {
            path: dst.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Logger that keeps every line in memory.
#[derive(Default)]
pub struct RecordingLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines.lock().expect("logger poisoned").clone()
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.lines().iter().any(|(_, line)| line.starts_with(prefix))
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.lines()
            .iter()
            .filter(|(_, line)| line.starts_with(prefix))
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.lines()
            .iter()
            .filter(|(level, _)| *level == Level::Error)
            .count()
    }

    fn push(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .expect("logger poisoned")
            .push((level, message.to_string()));
    }
}

impl BackupLogger for RecordingLogger {
    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }
}
