//! Capture-time lookup.
//!
//! A `CaptureTimeResolver` answers "when was this taken?" on a best-effort
//! basis and never fails; a file it cannot answer for is bucketed by its
//! filesystem modification time instead (`capture_datetime`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use tracing::debug;

use crate::error::EngineError;
use crate::model::dotted_extension;

/// Extensions the EXIF reader is attempted on. Video containers are not.
const EXIF_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".heic"];

/// EXIF tags consulted, in order of preference.
const DATE_TAGS: &[Tag] = &[Tag::DateTimeOriginal, Tag::DateTime, Tag::DateTimeDigitized];

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Best-effort capture-datetime lookup for one file.
///
/// Implementations must swallow their own errors and return `None` for
/// anything they cannot read.
pub trait CaptureTimeResolver {
    fn resolve(&self, path: &Path) -> Option<NaiveDateTime>;
}

impl<F> CaptureTimeResolver for F
where
    F: Fn(&Path) -> Option<NaiveDateTime>,
{
    fn resolve(&self, path: &Path) -> Option<NaiveDateTime> {
        self(path)
    }
}

/// Reads `DateTimeOriginal` / `DateTime` / `DateTimeDigitized` from EXIF.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifResolver;

impl CaptureTimeResolver for ExifResolver {
    fn resolve(&self, path: &Path) -> Option<NaiveDateTime> {
        let ext = dotted_extension(path)?;
        if !EXIF_EXTENSIONS.contains(&ext.as_str()) {
            return None;
        }

        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(e) => {
                debug!("no EXIF in {}: {}", path.display(), e);
                return None;
            }
        };

        DATE_TAGS.iter().find_map(|tag| {
            let field = exif.get_field(*tag, In::PRIMARY)?;
            match field.value {
                Value::Ascii(ref values) => values
                    .iter()
                    .filter_map(|raw| std::str::from_utf8(raw).ok())
                    .find_map(parse_exif_datetime),
                _ => None,
            }
        })
    }
}

/// Parse an EXIF `YYYY:MM:DD HH:MM:SS` value.
pub fn parse_exif_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value.trim(), EXIF_DATETIME_FORMAT).ok()
}

/// Last-modification time of `path` in local time.
pub fn modification_time(path: &Path) -> Result<NaiveDateTime, EngineError> {
    let metadata_err = |e| EngineError::MetadataError {
        path: path.to_path_buf(),
        source: e,
    };
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(metadata_err)?;
    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// Capture datetime for `path`: the resolver's answer, else the mtime.
pub fn capture_datetime(
    resolver: &dyn CaptureTimeResolver,
    path: &Path,
) -> Result<NaiveDateTime, EngineError> {
    match resolver.resolve(path) {
        Some(dt) => Ok(dt),
        None => modification_time(path),
    }
}
