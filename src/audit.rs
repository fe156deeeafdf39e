//! Append-only audit log with secret redaction.
//!
//! The sink is the only state shared across concurrent authentication
//! attempts: one append-only file, opened at most once per process and
//! guarded by a mutex so lines from concurrent attempts never interleave.
//! If the file cannot be opened or written, diagnostics degrade to stderr
//! rather than failing the attempt.
//!
//! The rest of the crate never touches the global directly; it receives an
//! `&AuditLog` capability from the entry points in [`crate::module`], and
//! tests construct private sinks on temporary paths.

use chrono::Utc;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tracing::{debug, error, info, warn};

/// Where the module writes its audit trail.
pub const LOG_PATH: &str = "/var/log/pam_permesi.log";

/// Replacement value for secrets in logged payloads.
pub const REDACTED: &str = "[REDACTED]";

static SHARED: OnceLock<AuditLog> = OnceLock::new();

/// The process-wide sink at [`LOG_PATH`], opened on first use.
pub fn shared() -> &'static AuditLog {
    SHARED.get_or_init(|| AuditLog::open(Path::new(LOG_PATH)))
}

enum Sink {
    File(File),
    Stderr,
}

/// Append-only line log, one `"<timestamp> - <message>"` entry per call.
///
/// Every write also emits a `tracing` event at the matching level, so a host
/// process that installs a subscriber sees the same diagnostics.
pub struct AuditLog {
    sink: Mutex<Sink>,
}

impl AuditLog {
    /// Open an append-only sink at `path`, creating the file `0o640` if absent.
    ///
    /// Never fails: when the file cannot be opened the sink degrades to
    /// stderr so a broken log path cannot break authentication.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let sink = match OpenOptions::new()
            .append(true)
            .create(true)
            .mode(0o640)
            .open(path)
        {
            Ok(file) => Sink::File(file),
            Err(err) => {
                eprintln!("pam_permesi: failed to open audit log {}: {err}", path.display());
                Sink::Stderr
            }
        };
        Self {
            sink: Mutex::new(sink),
        }
    }

    pub fn error(&self, message: &str) {
        error!("{message}");
        self.append(&format!("ERROR: {message}"));
    }

    pub fn warn(&self, message: &str) {
        warn!("{message}");
        self.append(&format!("WARN: {message}"));
    }

    pub fn info(&self, message: &str) {
        info!("{message}");
        self.append(&format!("INFO: {message}"));
    }

    /// Debug detail reaches the file only when the attempt's `debug` flag is
    /// set; the `tracing` mirror always fires and the subscriber decides.
    pub fn debug(&self, enabled: bool, message: &str) {
        debug!("{message}");
        if enabled {
            self.append(&format!("DEBUG: {message}"));
        }
    }

    fn append(&self, message: &str) {
        let line = format!("{} - {message}\n", Utc::now().format("%Y-%m-%d %H:%M:%S"));
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        match &mut *sink {
            Sink::File(file) => {
                if let Err(err) = file.write_all(line.as_bytes()) {
                    eprintln!("pam_permesi: failed to write audit log: {err}");
                    eprint!("{line}");
                }
            }
            Sink::Stderr => eprint!("{line}"),
        }
    }
}

/// Replace every map value whose key contains `key` or `token`
/// (case-insensitive) with [`REDACTED`], recursively.
pub fn redact_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                let key = key.to_lowercase();
                if key.contains("key") || key.contains("token") {
                    *entry = Value::String(REDACTED.to_string());
                } else {
                    redact_json(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_json(item);
            }
        }
        _ => {}
    }
}
