//! Logging port for the per-file audit trail.
//!
//! The orchestrator reports every decision it makes through `BackupLogger`
//! instead of a global sink, so the engine can be driven and inspected in
//! tests without any subscriber installed. `TracingLogger` is the production
//! implementation; the CLI decides where its events end up.

use tracing::{error, info, warn};

/// Receives the human-readable audit lines of a backup run.
///
/// All methods are called synchronously from the thread running the backup.
pub trait BackupLogger: Send {
    fn info(&self, message: &str);

    fn warn(&self, message: &str);

    fn error(&self, message: &str);
}

/// Forwards audit lines to `tracing` under the `photobak` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl BackupLogger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "photobak", "{}", message);
    }

    fn warn(&self, message: &str) {
        warn!(target: "photobak", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "photobak", "{}", message);
    }
}
