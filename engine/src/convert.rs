//! HEIC to JPEG conversion capability.
//!
//! The engine only needs "convert this file to that file at this quality,
//! tell me whether it worked". `CommandConverter` satisfies that by running
//! an external HEIF decoder that follows the `heif-convert` calling
//! convention: `<program> -q <quality> <input> <output>`.
//!
//! The decoder writes to a hidden sibling of the destination, which is
//! renamed into place only once the decoder reports success. A failed run
//! never touches an existing file at the destination.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::EngineError;

/// JPEG quality used for every conversion.
pub const HEIC_QUALITY: u8 = 95;

/// Default decoder program looked up on `PATH`.
pub const DEFAULT_CONVERTER_PROGRAM: &str = "heif-convert";

/// Decode `src` and write it to `dst` as JPEG.
pub trait ImageConverter {
    fn convert(&self, src: &Path, dst: &Path, quality: u8) -> Result<(), EngineError>;
}

/// Runs an external decoder process per file.
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl CommandConverter {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        CommandConverter {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Build from a whitespace-separated command line such as
    /// `"flatpak run org.example.Decoder"`. The quality and paths are
    /// appended after these words.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let mut converter = CommandConverter::new(words.next()?);
        converter.leading_args = words.map(OsString::from).collect();
        Some(converter)
    }

    /// Append an argument placed before `-q <quality> <input> <output>`.
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.leading_args.push(arg.into());
        self
    }
}

impl Default for CommandConverter {
    fn default() -> Self {
        CommandConverter::new(DEFAULT_CONVERTER_PROGRAM)
    }
}

impl ImageConverter for CommandConverter {
    fn convert(&self, src: &Path, dst: &Path, quality: u8) -> Result<(), EngineError> {
        let staging = staging_path(dst);
        debug!(
            "running {:?} -q {} {} {}",
            self.program,
            quality,
            src.display(),
            staging.display()
        );

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg("-q")
            .arg(quality.to_string())
            .arg(src)
            .arg(&staging)
            .stdin(Stdio::null())
            .output();

        let reason = match output {
            Ok(output) if output.status.success() && staging.is_file() => {
                return fs::rename(&staging, dst).map_err(|e| {
                    discard_staging(&staging);
                    EngineError::WriteError {
                        path: dst.to_path_buf(),
                        source: e,
                    }
                });
            }
            Ok(output) if output.status.success() => {
                "decoder exited successfully but wrote no output".to_string()
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("decoder exited with {}", output.status)
                } else {
                    format!("decoder exited with {}: {}", output.status, stderr)
                }
            }
            Err(e) => format!("could not run {:?}: {}", self.program, e),
        };

        discard_staging(&staging);

        Err(EngineError::ConversionFailed {
            path: src.to_path_buf(),
            reason,
        })
    }
}

/// Hidden sibling of `dst` that keeps its extension, since decoders pick the
/// output format from it.
fn staging_path(dst: &Path) -> PathBuf {
    let mut name = OsString::from(format!(".photobak-{}-", Uuid::new_v4().simple()));
    if let Some(file_name) = dst.file_name() {
        name.push(file_name);
    }
    dst.with_file_name(name)
}

fn discard_staging(staging: &Path) {
    match fs::remove_file(staging) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove partial output {}: {}", staging.display(), e),
    }
}
