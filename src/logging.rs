//! Structured JSONL logging to a file plus compact output on stderr.
//!
//! stdout carries the native messaging protocol, so nothing here ever writes
//! to it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use calc_bridge::logging;
//!
//! // Keep the guard alive until the process ends; dropping it flushes the file
//! let _guard = logging::init();
//! tracing::info!(event_type = "row_appended", row_index = 3, "Appended row");
//! ```
//!
//! # JSONL Output Format
//!
//! ```json
//! {"timestamp":"2025-03-07T10:30:45.123Z","level":"INFO","target":"calc_bridge::host","fields":{"message":"Appending row","stage":"appending"}}
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::APP_DIR_NAME;

/// Overrides the log directory
pub const LOG_DIR_ENV: &str = "CALC_BRIDGE_LOG_DIR";

const LOG_FILE_NAME: &str = "calc-bridge.jsonl";

const DEFAULT_FILTER: &str = "info,gpui=warn,ureq=warn";

/// Guard that must be kept alive for the duration of the program.
/// Dropping this guard will flush and close the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Log directory: `override_dir` if given, else `<data_local_dir>/calc-bridge/logs`
pub fn resolve_log_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME).join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join(format!("{}-logs", APP_DIR_NAME)))
}

fn log_dir() -> PathBuf {
    let from_env = std::env::var_os(LOG_DIR_ENV).map(PathBuf::from);
    resolve_log_dir(from_env.as_deref())
}

/// Path of the JSONL log file
pub fn log_path() -> PathBuf {
    log_dir().join(LOG_FILE_NAME)
}

fn open_log_file(path: &Path) -> Box<dyn Write + Send> {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("[LOGGING] Failed to create log directory: {}", e);
        }
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Box::new(file),
        Err(e) => {
            eprintln!("[LOGGING] Failed to open log file: {}", e);
            Box::new(std::io::sink())
        }
    }
}

/// Initialize the dual-output logging system.
///
/// Returns a guard that MUST be kept alive for the duration of the program.
pub fn init() -> LoggingGuard {
    let log_path = log_path();
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(open_log_file(&log_path));

    // Default to info, allow override via RUST_LOG
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json_layer = fmt::layer()
        .json()
        .with_writer(non_blocking_file)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber
    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    tracing::info!(
        event_type = "app_lifecycle",
        action = "started",
        installed,
        log_path = %log_path.display(),
        "Logging initialized"
    );

    LoggingGuard {
        _file_guard: file_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = Path::new("/tmp/calc-bridge-test-logs");
        assert_eq!(resolve_log_dir(Some(dir)), dir);
    }

    #[test]
    fn test_default_dir_is_app_scoped() {
        let dir = resolve_log_dir(None);
        let rendered = dir.to_string_lossy();
        assert!(rendered.contains(APP_DIR_NAME), "{}", rendered);
    }

    #[test]
    fn test_unwritable_log_path_falls_back_to_sink() {
        let tmp = tempfile::tempdir().unwrap();
        // A directory cannot be opened as a log file
        let mut writer = open_log_file(tmp.path());
        assert!(writer.write_all(b"{}\n").is_ok());
    }
}
