//! File logging.
//!
//! ratatui owns the terminal while the app runs, so nothing may print to
//! stdout or stderr. Everything goes through `tracing` into a daily-rolling
//! file under the platform log directory instead.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rand::Rng;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

/// Prefix of every log file; the rolling appender adds a date suffix.
const LOG_FILE_PREFIX: &str = "scholarmind";

/// Log files older than this are deleted at startup.
const LOG_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Handle to the running logging pipeline.
pub struct LoggingContext {
    /// Flushes buffered lines when dropped. Hold it until exit.
    pub _guard: WorkerGuard,
    /// Random id tying together every log line of this run.
    pub session_id: String,
    pub log_directory: PathBuf,
}

/// Installs the file subscriber and logs the session start.
///
/// `level` is the configured default filter; a set `RUST_LOG` still wins.
pub fn init(level: &str) -> Result<LoggingContext> {
    let session_id = new_session_id();

    let log_dir = log_directory().context("could not determine a log directory")?;
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("could not create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_span_events(FmtSpan::NONE)
                .with_target(true),
        )
        .init();

    info!(session_id = %session_id, "session_start");

    Ok(LoggingContext {
        _guard: guard,
        session_id,
        log_directory: log_dir,
    })
}

/// Six hex chars, enough to tell overlapping days of logs apart.
fn new_session_id() -> String {
    let bytes: [u8; 3] = rand::rng().random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Platform log directory. ProjectDirs has no notion of ~/Library/Logs,
/// so macOS is special-cased; everywhere else the state dir is right.
fn log_directory() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        return dirs::home_dir().map(|home| home.join("Library").join("Logs").join("scholarmind"));
    }
    ProjectDirs::from("dev", "scholarmind", "scholarmind")
        .and_then(|dirs| dirs.state_dir().map(PathBuf::from))
}

/// Deletes rotated log files past the retention window. Failures are
/// logged and skipped; cleanup must never block startup.
pub fn cleanup_old_logs(log_dir: &Path) {
    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "log_cleanup_scan_failed");
            return;
        }
    };

    let now = SystemTime::now();
    let mut deleted = 0u32;

    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_rotated_log(name) {
            continue;
        }
        // A future mtime means the clock moved; leave the file alone.
        let Some(age) = file_age(&path, now) else {
            continue;
        };
        if age <= LOG_RETENTION {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => deleted += 1,
            Err(e) => warn!(file = %name, error = %e, "log_cleanup_delete_failed"),
        }
    }

    if deleted > 0 {
        debug!(count = deleted, "old_logs_deleted");
    }
}

/// Rotated files look like `scholarmind.2026-08-22`; the bare prefix and
/// anything else in the directory are not ours to delete.
fn is_rotated_log(name: &str) -> bool {
    name.strip_prefix(LOG_FILE_PREFIX)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|suffix| !suffix.is_empty())
}

fn file_age(path: &Path, now: SystemTime) -> Option<Duration> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    now.duration_since(modified).ok()
}
